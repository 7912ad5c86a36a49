pub mod diagnostics;
pub mod keywords;
pub mod parser;
pub mod scanner;
