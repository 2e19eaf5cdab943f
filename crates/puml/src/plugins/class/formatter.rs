//! Class diagram formatters
//!
//! [`DefaultFormatter`] produces the JSON document written by the CLI.
//! [`OutlineFormatter`] renders an indented, human-readable summary with
//! member columns aligned by display width.

use std::fmt::Write as _;

use anyhow::Result;
use unicode_width::UnicodeWidthStr;

use super::database::{
    ArrowHead, Class, Diagram, Element, LineStyle, Member, NotePosition, Relationship,
    RelationshipKind, Visibility,
};
use crate::core::{to_json, Formatter};

/// Pretty-printed JSON of the whole diagram sequence
pub struct DefaultFormatter;

impl DefaultFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DefaultFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter<Diagram> for DefaultFormatter {
    fn format(&self, diagrams: &[Diagram]) -> Result<String> {
        to_json(diagrams)
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

/// Indented text summary of every diagram
pub struct OutlineFormatter {
    indent: usize,
}

impl OutlineFormatter {
    pub fn new() -> Self {
        Self { indent: 2 }
    }

    /// Spaces per nesting level
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    fn pad(&self, depth: usize) -> String {
        " ".repeat(self.indent * depth)
    }

    fn write_elements(&self, out: &mut String, elements: &[Element], depth: usize) -> Result<()> {
        let pad = self.pad(depth);
        for element in elements {
            match element {
                Element::Class(class) => self.write_class(out, class, depth)?,
                Element::Relationship(rel) => writeln!(out, "{}{}", pad, relationship_line(rel))?,
                Element::Package(package) => {
                    let keyword = if package.namespace {
                        "namespace"
                    } else {
                        "package"
                    };
                    write!(out, "{}{} {}", pad, keyword, package.name)?;
                    if let Some(title) = &package.title {
                        write!(out, " \"{}\"", title)?;
                    }
                    writeln!(out)?;
                    self.write_elements(out, &package.elements, depth + 1)?;
                }
                Element::Note(note) => {
                    write!(out, "{}note", pad)?;
                    match (note.position, &note.target) {
                        (Some(NotePosition::OnLink), _) => write!(out, " on link")?,
                        (Some(position), Some(target)) => {
                            write!(out, " {} of {}", position_word(position), target)?
                        }
                        (Some(position), None) => write!(out, " {}", position_word(position))?,
                        (None, _) => {}
                    }
                    if let Some(alias) = &note.alias {
                        write!(out, " as {}", alias)?;
                    }
                    writeln!(out, ": {}", note.text.replace('\n', " / "))?;
                }
                Element::Comment(comment) => writeln!(out, "{}' {}", pad, comment.text)?,
                Element::Member(decl) => {
                    let member = &decl.member;
                    write!(out, "{}{} : {}", pad, decl.class, signature(member))?;
                    match &member.member_type {
                        Some(ty) => writeln!(out, " : {}", ty)?,
                        None => writeln!(out)?,
                    }
                }
            }
        }
        Ok(())
    }

    fn write_class(&self, out: &mut String, class: &Class, depth: usize) -> Result<()> {
        write!(out, "{}{} {}", self.pad(depth), class.class_kind.keyword(), class.name)?;
        if !class.generics.is_empty() {
            write!(out, "<{}>", class.generics.join(", "))?;
        }
        if let Some(title) = &class.title {
            write!(out, " \"{}\"", title)?;
        }
        for stereotype in &class.stereotypes {
            write!(out, " <<{}>>", stereotype.name)?;
        }
        if !class.extends.is_empty() {
            write!(out, " extends {}", class.extends.join(", "))?;
        }
        if !class.implements.is_empty() {
            write!(out, " implements {}", class.implements.join(", "))?;
        }
        writeln!(out)?;

        let signatures: Vec<String> = class.members.iter().map(signature).collect();
        let column = class
            .members
            .iter()
            .zip(&signatures)
            .filter(|(member, _)| member.member_type.is_some())
            .map(|(_, sig)| sig.width())
            .max()
            .unwrap_or(0);

        let pad = self.pad(depth + 1);
        for (member, sig) in class.members.iter().zip(&signatures) {
            match &member.member_type {
                Some(ty) => {
                    let fill = " ".repeat(column.saturating_sub(sig.width()));
                    writeln!(out, "{}{}{} : {}", pad, sig, fill, ty)?;
                }
                None => writeln!(out, "{}{}", pad, sig)?,
            }
        }
        Ok(())
    }
}

impl Default for OutlineFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter<Diagram> for OutlineFormatter {
    fn format(&self, diagrams: &[Diagram]) -> Result<String> {
        let mut out = String::new();
        for (index, diagram) in diagrams.iter().enumerate() {
            write!(out, "diagram {}", index + 1)?;
            if let Some(name) = &diagram.name {
                write!(out, " {}", name)?;
            }
            if let Some(title) = &diagram.title {
                write!(out, " \"{}\"", title)?;
            }
            writeln!(out)?;
            self.write_elements(&mut out, &diagram.elements, 1)?;
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "outline"
    }
}

/// `{static} +name(a : int)` without the type
fn signature(member: &Member) -> String {
    let mut sig = String::new();
    if member.is_static() {
        sig.push_str("{static} ");
    }
    if member.is_abstract() {
        sig.push_str("{abstract} ");
    }
    if let Some(visibility) = member.visibility {
        sig.push(Visibility::to_char(visibility));
    }
    sig.push_str(&member.name);
    if member.is_method() {
        let params: Vec<String> = member
            .parameters
            .iter()
            .map(|p| match &p.param_type {
                Some(ty) => format!("{} : {}", p.name, ty),
                None => p.name.clone(),
            })
            .collect();
        write!(sig, "({})", params.join(", ")).ok();
    }
    sig
}

fn relationship_line(rel: &Relationship) -> String {
    let mut line = rel.left.clone();
    if let Some(card) = &rel.left_cardinality {
        write!(line, " \"{}\"", card).ok();
    }
    write!(line, " {}", arrow(rel)).ok();
    if let Some(card) = &rel.right_cardinality {
        write!(line, " \"{}\"", card).ok();
    }
    write!(line, " {}", rel.right).ok();
    if let Some(label) = &rel.label {
        write!(line, " : {}", label).ok();
    }
    write!(line, " [{}]", kind_word(rel.relation_kind)).ok();
    line
}

/// Arrow text normalized to two line characters, e.g. `<|--` or `..>`
fn arrow(rel: &Relationship) -> String {
    let left = rel.left_head.map(|head| match head {
        ArrowHead::Extension => "<|",
        ArrowHead::Arrow => "<",
        ArrowHead::Composition => "*",
        ArrowHead::Aggregation => "o",
        ArrowHead::Crowfoot => "}",
        ArrowHead::Cross => "x",
        ArrowHead::Hash => "#",
        ArrowHead::Nested => "+",
        ArrowHead::ZeroOrOne => "|o",
        ArrowHead::ExactlyOne => "||",
        ArrowHead::ZeroOrMany => "}o",
        ArrowHead::OneOrMany => "}|",
    });
    let right = rel.right_head.map(|head| match head {
        ArrowHead::Extension => "|>",
        ArrowHead::Arrow => ">",
        ArrowHead::Composition => "*",
        ArrowHead::Aggregation => "o",
        ArrowHead::Crowfoot => "{",
        ArrowHead::Cross => "x",
        ArrowHead::Hash => "#",
        ArrowHead::Nested => "+",
        ArrowHead::ZeroOrOne => "o|",
        ArrowHead::ExactlyOne => "||",
        ArrowHead::ZeroOrMany => "o{",
        ArrowHead::OneOrMany => "|{",
    });
    let body = match rel.line {
        LineStyle::Solid => "--",
        LineStyle::Dashed => "..",
    };
    format!("{}{}{}", left.unwrap_or(""), body, right.unwrap_or(""))
}

fn kind_word(kind: RelationshipKind) -> &'static str {
    match kind {
        RelationshipKind::Inheritance => "inheritance",
        RelationshipKind::Realization => "realization",
        RelationshipKind::Composition => "composition",
        RelationshipKind::Aggregation => "aggregation",
        RelationshipKind::Association => "association",
        RelationshipKind::Dependency => "dependency",
        RelationshipKind::Link => "link",
        RelationshipKind::DashedLink => "dashed link",
    }
}

fn position_word(position: NotePosition) -> &'static str {
    match position {
        NotePosition::Left => "left",
        NotePosition::Right => "right",
        NotePosition::Top => "top",
        NotePosition::Bottom => "bottom",
        NotePosition::OnLink => "on link",
    }
}
