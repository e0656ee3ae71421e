//! Simple Parser Module
//!
//! Parses the token stream into an Abstract Syntax Tree (AST).

mod ast;
mod options;
mod recursive_parser;

pub use ast::{
    AssignStatement, Atom, AtomKind, BinaryExpression, ConditionalStatement, ElifBlock, ElseBlock,
    Expression, FnCall, ForLoopStatement, ForUpdate, FunctionAssignStatement, Program,
    ReassignStatement, ReturnStatement, Statement,
};
pub use options::ParserOptions;
pub use recursive_parser::Parser;
