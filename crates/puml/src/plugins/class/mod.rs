//! Class diagram plugin
//!
//! Implements PlantUML class diagram parsing and formatting.

mod chumsky_parser;
mod database;
mod formatter;
mod parser;

pub use chumsky_parser::{
    split_top_level, BodyStart, ChumskyClassParser, ParsedClass, ParsedNote, ParsedPackage,
    Statement,
};
pub use database::{
    ArrowDirection, ArrowHead, Class, ClassKind, Comment, Diagram, Element, LabelDirection,
    LineStyle, Member, MemberDeclaration, MemberKind, Modifier, Note, NotePosition, Package,
    Parameter, Relationship, RelationshipKind, Stereotype, Visibility,
};
pub use formatter::{DefaultFormatter, OutlineFormatter};
pub use parser::PlantUmlParser;
