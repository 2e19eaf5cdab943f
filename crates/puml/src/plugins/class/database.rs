//! Class diagram database
//!
//! Stores the elements of one `@startuml ... @enduml` block. Every type here
//! serializes to the JSON written by the converter, with camelCase field
//! names and absent optional fields omitted.

use serde::{Deserialize, Serialize};

/// Visibility modifier for class members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    Public,    // +
    Private,   // -
    Protected, // #
    Package,   // ~
}

impl Visibility {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Visibility::Public),
            '-' => Some(Visibility::Private),
            '#' => Some(Visibility::Protected),
            '~' => Some(Visibility::Package),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Visibility::Public => '+',
            Visibility::Private => '-',
            Visibility::Protected => '#',
            Visibility::Package => '~',
        }
    }
}

/// Member modifiers (`{static}`, `{abstract}`, trailing `$` / `*`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Modifier {
    Abstract,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemberKind {
    #[default]
    Field,
    Method,
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: None,
        }
    }

    pub fn with_type(mut self, t: impl Into<String>) -> Self {
        self.param_type = Some(t.into());
        self
    }
}

/// A class member (attribute, method, or enum constant)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub member_kind: MemberKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            member_type: None,
            visibility: None,
            modifiers: Vec::new(),
            member_kind: MemberKind::Field,
            parameters: Vec::new(),
        }
    }

    pub fn attribute(name: impl Into<String>) -> Self {
        Self::new(name)
    }

    pub fn method(name: impl Into<String>) -> Self {
        Self {
            member_kind: MemberKind::Method,
            ..Self::new(name)
        }
    }

    pub fn with_visibility(mut self, v: Visibility) -> Self {
        self.visibility = Some(v);
        self
    }

    pub fn with_type(mut self, t: impl Into<String>) -> Self {
        self.member_type = Some(t.into());
        self
    }

    pub fn with_modifier(mut self, m: Modifier) -> Self {
        if !self.modifiers.contains(&m) {
            self.modifiers.push(m);
        }
        self
    }

    pub fn with_parameter(mut self, p: Parameter) -> Self {
        self.parameters.push(p);
        self
    }

    pub fn is_method(&self) -> bool {
        self.member_kind == MemberKind::Method
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(&Modifier::Static)
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(&Modifier::Abstract)
    }
}

/// Declaration keyword of a class-like element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClassKind {
    #[default]
    Class,
    Abstract,
    Interface,
    Enum,
    Annotation,
    Entity,
    Exception,
    Struct,
    Protocol,
    Record,
}

impl ClassKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Abstract => "abstract class",
            ClassKind::Interface => "interface",
            ClassKind::Enum => "enum",
            ClassKind::Annotation => "annotation",
            ClassKind::Entity => "entity",
            ClassKind::Exception => "exception",
            ClassKind::Struct => "struct",
            ClassKind::Protocol => "protocol",
            ClassKind::Record => "record",
        }
    }
}

/// A `<<stereotype>>`, with the optional `(C,color)` spot split out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stereotype {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot: Option<String>,
}

impl Stereotype {
    /// Build from the raw text between `<<` and `>>`
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix('(') {
            if let Some(close) = rest.find(')') {
                return Self {
                    name: rest[close + 1..].trim().to_string(),
                    spot: Some(rest[..close].trim().to_string()),
                };
            }
        }
        Self {
            name: raw.to_string(),
            spot: None,
        }
    }
}

/// A class (or interface, enum, ...) in the diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub class_kind: ClassKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stereotypes: Vec<Stereotype>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            class_kind: ClassKind::Class,
            generics: Vec::new(),
            stereotypes: Vec::new(),
            color: None,
            extends: Vec::new(),
            implements: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.class_kind = kind;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn add_member(&mut self, member: Member) {
        self.members.push(member);
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| !m.is_method())
    }

    pub fn methods(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.is_method())
    }

    pub fn is_abstract(&self) -> bool {
        self.class_kind == ClassKind::Abstract
    }
}

/// Arrow decoration at one end of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrowHead {
    Extension,   // <| |> ^
    Composition, // *
    Aggregation, // o
    Arrow,       // < >
    Crowfoot,    // } {
    Cross,       // x
    Hash,        // #
    Nested,      // +
    ZeroOrOne,   // |o o|
    ExactlyOne,  // ||
    ZeroOrMany,  // }o o{
    OneOrMany,   // }| |{
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

/// Layout hint embedded in an arrow (`-up->`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrowDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Reading direction of a relationship label (`: label >`, `: < label`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelDirection {
    Forward,
    Backward,
}

/// Relationship type between classes, derived from the arrow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipKind {
    Inheritance, // <|--
    Realization, // <|..
    Composition, // *--
    Aggregation, // o--
    Association, // -->
    Dependency,  // ..>
    Link,        // --
    DashedLink,  // ..
}

impl RelationshipKind {
    /// Classify an arrow by its strongest head and its line style
    pub fn classify(left: Option<ArrowHead>, right: Option<ArrowHead>, line: LineStyle) -> Self {
        let has = |head: ArrowHead| left == Some(head) || right == Some(head);
        let dashed = line == LineStyle::Dashed;

        if has(ArrowHead::Extension) {
            if dashed {
                RelationshipKind::Realization
            } else {
                RelationshipKind::Inheritance
            }
        } else if has(ArrowHead::Composition) {
            RelationshipKind::Composition
        } else if has(ArrowHead::Aggregation) {
            RelationshipKind::Aggregation
        } else if left.is_some() || right.is_some() {
            if dashed {
                RelationshipKind::Dependency
            } else {
                RelationshipKind::Association
            }
        } else if dashed {
            RelationshipKind::DashedLink
        } else {
            RelationshipKind::Link
        }
    }
}

/// A relationship between classes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub left: String,
    pub right: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_head: Option<ArrowHead>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_head: Option<ArrowHead>,
    #[serde(default)]
    pub line: LineStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<ArrowDirection>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_cardinality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_cardinality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_direction: Option<LabelDirection>,
    pub relation_kind: RelationshipKind,
}

impl Relationship {
    pub fn new(left: impl Into<String>, right: impl Into<String>, kind: RelationshipKind) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            left_head: None,
            right_head: None,
            line: LineStyle::Solid,
            direction: None,
            hidden: false,
            style: None,
            left_cardinality: None,
            right_cardinality: None,
            label: None,
            label_direction: None,
            relation_kind: kind,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A package or namespace grouping other elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub namespace: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stereotypes: Vec<Stereotype>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<Element>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            namespace: false,
            stereotypes: Vec::new(),
            elements: Vec::new(),
        }
    }
}

/// Where a note is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotePosition {
    Left,
    Right,
    Top,
    Bottom,
    OnLink,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<NotePosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub text: String,
}

/// `Name : member` written outside any class body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDeclaration {
    pub class: String,
    pub member: Member,
}

/// Any top-level or package-level statement of a class diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Element {
    Class(Class),
    Relationship(Relationship),
    Package(Package),
    Note(Note),
    Comment(Comment),
    Member(MemberDeclaration),
}

/// One parsed `@startuml ... @enduml` block
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<Element>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Every class, including those nested in packages, in source order
    pub fn classes(&self) -> Vec<&Class> {
        let mut out = Vec::new();
        collect(&self.elements, &mut |e| {
            if let Element::Class(c) = e {
                out.push(c);
            }
        });
        out
    }

    /// Every relationship, including those nested in packages, in source order
    pub fn relationships(&self) -> Vec<&Relationship> {
        let mut out = Vec::new();
        collect(&self.elements, &mut |e| {
            if let Element::Relationship(r) = e {
                out.push(r);
            }
        });
        out
    }

    pub fn notes(&self) -> Vec<&Note> {
        let mut out = Vec::new();
        collect(&self.elements, &mut |e| {
            if let Element::Note(n) = e {
                out.push(n);
            }
        });
        out
    }

    pub fn class_count(&self) -> usize {
        self.classes().len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships().len()
    }

    pub fn get_class(&self, name: &str) -> Option<&Class> {
        self.classes().into_iter().find(|c| c.name == name)
    }
}

fn collect<'a>(elements: &'a [Element], visit: &mut impl FnMut(&'a Element)) {
    for element in elements {
        visit(element);
        if let Element::Package(p) = element {
            collect(&p.elements, visit);
        }
    }
}
