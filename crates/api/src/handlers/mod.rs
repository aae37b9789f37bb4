pub mod retrospective;
