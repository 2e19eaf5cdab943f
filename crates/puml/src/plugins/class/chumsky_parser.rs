//! Class diagram statement parser using chumsky
//!
//! Parses single PlantUML statements (one trimmed line each) into AST
//! structures. Block structure such as class bodies, packages, multi-line
//! notes and comments is handled by the line-driven `PlantUmlParser`.

use super::database::{
    ArrowDirection, ArrowHead, Class, ClassKind, LabelDirection, LineStyle, Note, NotePosition,
    Package, Relationship, RelationshipKind, Stereotype,
};
use crate::core::chumsky_utils::{
    inline_whitespace, inline_whitespace_required, qualified_name, quoted_string, rest_of_line,
};
use anyhow::Result;
use chumsky::prelude::*;
use chumsky::text::ident;

/// How a class declaration line ends
#[derive(Debug, Clone, PartialEq)]
pub enum BodyStart {
    /// No brace; a lone `{` may still follow on the next line
    None,
    /// `{` opens a multi-line body, optionally with a first member after it
    Open(Option<String>),
    /// `{ ... }` on the same line, optionally holding one member
    Closed(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedClass {
    pub class: Class,
    pub body: BodyStart,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPackage {
    pub package: Package,
    /// `{}` on the declaration line
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedNote {
    /// Note text is complete on this line
    Inline(Note),
    /// Note text follows on the next lines, up to `end note`
    Open(Note),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Class(ParsedClass),
    Package(ParsedPackage),
    Together,
    Note(ParsedNote),
    Relationship(Relationship),
    /// `Name : member text`
    Member { class: String, text: String },
}

/// Name written either bare or in double quotes
#[derive(Debug, Clone, PartialEq)]
enum NameToken {
    Bare(String),
    Quoted(String),
}

impl NameToken {
    fn into_string(self) -> String {
        match self {
            NameToken::Bare(s) | NameToken::Quoted(s) => s,
        }
    }
}

/// Resolve `X as Y` into an identifier and an optional display title.
///
/// The quoted side is the title; with two bare names the alias is the identifier.
fn resolve_alias(name: NameToken, alias: Option<NameToken>) -> (String, Option<String>) {
    match (name, alias) {
        (name, None) => (name.into_string(), None),
        (NameToken::Quoted(title), Some(alias)) => (alias.into_string(), Some(title)),
        (NameToken::Bare(id), Some(NameToken::Quoted(title))) => (id, Some(title)),
        (NameToken::Bare(title), Some(NameToken::Bare(id))) => (id, Some(title)),
    }
}

/// Split on `sep` outside of `<>`, `()`, `[]` and `{}`
pub fn split_top_level(input: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    for c in input.chars() {
        match c {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' | ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if c == sep && depth == 0 {
            parts.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    parts.push(current.trim().to_string());
    parts.retain(|p| !p.is_empty());
    parts
}

/// Chumsky-based class diagram statement parser
pub struct ChumskyClassParser;

impl ChumskyClassParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a single statement (class, package, note, relationship, member)
    pub fn parse_statement(&self, input: &str) -> Result<Statement> {
        let parser = Self::statement_parser().then_ignore(end());

        parser
            .parse(input.trim())
            .into_result()
            .map_err(|errors| anyhow::anyhow!("Parse errors: {:?}", errors))
    }

    fn statement_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        // Keyword statements first, so a class named `note` never shadows them
        Self::class_parser()
            .map(Statement::Class)
            .or(Self::package_parser().map(Statement::Package))
            .or(Self::together_parser().to(Statement::Together))
            .or(Self::note_parser().map(Statement::Note))
            .or(Self::relationship_parser().map(Statement::Relationship))
            .or(Self::member_declaration_parser())
    }

    fn name_token<'src>() -> impl Parser<'src, &'src str, NameToken> + Clone {
        quoted_string()
            .map(NameToken::Quoted)
            .or(qualified_name().map(NameToken::Bare))
    }

    /// `Name`, `"Title"`, `"Title" as Name`, `Name as "Title"`
    fn name_declaration<'src>() -> impl Parser<'src, &'src str, (String, Option<String>)> + Clone
    {
        let alias = inline_whitespace_required()
            .ignore_then(text::keyword("as"))
            .ignore_then(inline_whitespace_required())
            .ignore_then(Self::name_token());

        Self::name_token()
            .then(alias.or_not())
            .map(|(name, alias)| resolve_alias(name, alias))
    }

    fn stereotype<'src>() -> impl Parser<'src, &'src str, Stereotype> + Clone {
        just("<<")
            .ignore_then(none_of('>').repeated().to_slice())
            .then_ignore(just(">>"))
            .map(Stereotype::parse)
    }

    fn stereotypes<'src>() -> impl Parser<'src, &'src str, Vec<Stereotype>> + Clone {
        inline_whitespace()
            .ignore_then(Self::stereotype())
            .repeated()
            .collect()
    }

    /// `#color` or `#line:style;back:color` suffix, kept verbatim
    fn color<'src>() -> impl Parser<'src, &'src str, String> + Clone {
        inline_whitespace()
            .ignore_then(
                just('#')
                    .then(none_of(" \t{").repeated().at_least(1))
                    .to_slice(),
            )
            .map(|s: &str| s.to_string())
    }

    /// Text between `<` and `>`, allowing one nested `<...>`
    fn type_arguments<'src>() -> impl Parser<'src, &'src str, &'src str> + Clone {
        let nested = just('<')
            .then(none_of("<>").repeated())
            .then(just('>'))
            .ignored();

        // Must not start with `<`, which would be a `<<stereotype>>`
        let content = none_of("<>")
            .then(none_of("<>").ignored().or(nested).repeated())
            .to_slice();

        just('<').ignore_then(content).then_ignore(just('>'))
    }

    /// `<T>`, `<K, V>`, `<T extends Comparable<T>>` (one nesting level)
    fn generics<'src>() -> impl Parser<'src, &'src str, Vec<String>> + Clone {
        inline_whitespace()
            .ignore_then(Self::type_arguments())
            .map(|s: &str| split_top_level(s, ','))
    }

    fn class_kind<'src>() -> impl Parser<'src, &'src str, ClassKind> + Clone {
        let abstract_class = text::keyword("abstract")
            .then(
                inline_whitespace_required()
                    .then(text::keyword("class"))
                    .or_not(),
            )
            .to(ClassKind::Abstract);

        abstract_class
            .or(text::keyword("class").to(ClassKind::Class))
            .or(text::keyword("interface").to(ClassKind::Interface))
            .or(text::keyword("enum").to(ClassKind::Enum))
            .or(text::keyword("annotation").to(ClassKind::Annotation))
            .or(text::keyword("entity").to(ClassKind::Entity))
            .or(text::keyword("exception").to(ClassKind::Exception))
            .or(text::keyword("struct").to(ClassKind::Struct))
            .or(text::keyword("protocol").to(ClassKind::Protocol))
            .or(text::keyword("record").to(ClassKind::Record))
    }

    /// Supertypes such as `AbstractList<E>, Comparable<Map<K, V>>`, kept verbatim
    fn name_list<'src>() -> impl Parser<'src, &'src str, Vec<String>> + Clone {
        qualified_name()
            .then(Self::type_arguments().or_not())
            .to_slice()
            .map(|s: &str| s.to_string())
            .separated_by(just(',').padded_by(inline_whitespace()))
            .at_least(1)
            .collect()
    }

    fn inheritance_clause<'src>(
        keyword: &'static str,
    ) -> impl Parser<'src, &'src str, Vec<String>> + Clone {
        inline_whitespace_required()
            .ignore_then(text::keyword(keyword))
            .ignore_then(inline_whitespace_required())
            .ignore_then(Self::name_list())
    }

    fn body_start<'src>() -> impl Parser<'src, &'src str, BodyStart> + Clone {
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };

        inline_whitespace()
            .ignore_then(just('{'))
            .ignore_then(none_of('}').repeated().to_slice())
            .then(just('}').or_not())
            .map(move |(content, close): (&str, Option<char>)| match close {
                Some(_) => BodyStart::Closed(non_empty(content)),
                None => BodyStart::Open(non_empty(content)),
            })
            .or_not()
            .map(|body| body.unwrap_or(BodyStart::None))
    }

    fn class_parser<'src>() -> impl Parser<'src, &'src str, ParsedClass> + Clone {
        Self::class_kind()
            .then_ignore(inline_whitespace_required())
            .then(Self::name_declaration())
            .then(Self::generics().or_not())
            .then(Self::stereotypes())
            .then(Self::color().or_not())
            .then(Self::inheritance_clause("extends").or_not())
            .then(Self::inheritance_clause("implements").or_not())
            .then(Self::body_start())
            .then_ignore(inline_whitespace())
            .map(
                |(
                    ((((((kind, (name, title)), generics), stereotypes), color), extends), implements),
                    body,
                )| {
                    let mut class = Class::new(name).with_kind(kind);
                    class.title = title;
                    class.generics = generics.unwrap_or_default();
                    class.stereotypes = stereotypes;
                    class.color = color;
                    class.extends = extends.unwrap_or_default();
                    class.implements = implements.unwrap_or_default();
                    ParsedClass { class, body }
                },
            )
    }

    fn package_parser<'src>() -> impl Parser<'src, &'src str, ParsedPackage> + Clone {
        let kind = text::keyword("package")
            .to(false)
            .or(text::keyword("namespace").to(true));

        kind.then_ignore(inline_whitespace_required())
            .then(Self::name_declaration())
            .then(Self::stereotypes())
            .then_ignore(Self::color().or_not())
            .then_ignore(inline_whitespace())
            .then_ignore(just('{'))
            .then_ignore(inline_whitespace())
            .then(just('}').or_not())
            .then_ignore(inline_whitespace())
            .map(|(((namespace, (name, title)), stereotypes), close)| {
                let mut package = Package::new(name);
                package.title = title;
                package.namespace = namespace;
                package.stereotypes = stereotypes;
                ParsedPackage {
                    package,
                    closed: close.is_some(),
                }
            })
    }

    fn together_parser<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
        text::keyword("together")
            .then(inline_whitespace())
            .then(just('{'))
            .then(inline_whitespace())
            .ignored()
    }

    fn note_parser<'src>() -> impl Parser<'src, &'src str, ParsedNote> + Clone {
        let ws1 = inline_whitespace_required();
        let note = text::keyword("note").then(ws1.clone());

        let note_text = inline_whitespace()
            .ignore_then(just(':'))
            .ignore_then(rest_of_line());

        let position = text::keyword("left")
            .to(NotePosition::Left)
            .or(text::keyword("right").to(NotePosition::Right))
            .or(text::keyword("top").to(NotePosition::Top))
            .or(text::keyword("bottom").to(NotePosition::Bottom));

        // note "text" as N1
        let floating = note
            .clone()
            .ignore_then(quoted_string())
            .then(
                ws1.clone()
                    .ignore_then(text::keyword("as"))
                    .ignore_then(ws1.clone())
                    .ignore_then(ident().map(|s: &str| s.to_string()))
                    .or_not(),
            )
            .map(|(text, alias)| {
                ParsedNote::Inline(Note {
                    alias,
                    text,
                    position: None,
                    target: None,
                })
            });

        // note as N1 ... end note
        let floating_open = note
            .clone()
            .ignore_then(text::keyword("as"))
            .ignore_then(ws1.clone())
            .ignore_then(ident().map(|s: &str| s.to_string()))
            .map(|alias| {
                ParsedNote::Open(Note {
                    alias: Some(alias),
                    text: String::new(),
                    position: None,
                    target: None,
                })
            });

        // note on link [: text]
        let on_link = note
            .clone()
            .ignore_then(text::keyword("on"))
            .ignore_then(ws1.clone())
            .ignore_then(text::keyword("link"))
            .ignore_then(note_text.clone().or_not())
            .map(|text| attached_note(NotePosition::OnLink, None, text));

        // note left of Order [: text]
        let attached = note
            .ignore_then(position)
            .then(
                ws1.clone()
                    .ignore_then(text::keyword("of"))
                    .ignore_then(ws1)
                    .ignore_then(Self::name_token().map(NameToken::into_string))
                    .or_not(),
            )
            .then(note_text.or_not())
            .map(|((position, target), text)| attached_note(position, target, text));

        floating
            .or(floating_open)
            .or(on_link)
            .or(attached)
            .then_ignore(Self::color().or_not())
            .then_ignore(inline_whitespace())
    }

    fn arrow_head_left<'src>() -> impl Parser<'src, &'src str, ArrowHead> + Clone {
        just("<|")
            .to(ArrowHead::Extension)
            .or(just("|o").to(ArrowHead::ZeroOrOne))
            .or(just("||").to(ArrowHead::ExactlyOne))
            .or(just("}o").to(ArrowHead::ZeroOrMany))
            .or(just("}|").to(ArrowHead::OneOrMany))
            .or(just("^").to(ArrowHead::Extension))
            .or(just("<").to(ArrowHead::Arrow))
            .or(just("*").to(ArrowHead::Composition))
            .or(just("o").to(ArrowHead::Aggregation))
            .or(just("}").to(ArrowHead::Crowfoot))
            .or(just("x").to(ArrowHead::Cross))
            .or(just("#").to(ArrowHead::Hash))
            .or(just("+").to(ArrowHead::Nested))
    }

    fn arrow_head_right<'src>() -> impl Parser<'src, &'src str, ArrowHead> + Clone {
        just("|>")
            .to(ArrowHead::Extension)
            .or(just("o|").to(ArrowHead::ZeroOrOne))
            .or(just("||").to(ArrowHead::ExactlyOne))
            .or(just("o{").to(ArrowHead::ZeroOrMany))
            .or(just("|{").to(ArrowHead::OneOrMany))
            .or(just("^").to(ArrowHead::Extension))
            .or(just(">").to(ArrowHead::Arrow))
            .or(just("*").to(ArrowHead::Composition))
            .or(just("o").to(ArrowHead::Aggregation))
            .or(just("{").to(ArrowHead::Crowfoot))
            .or(just("x").to(ArrowHead::Cross))
            .or(just("#").to(ArrowHead::Hash))
            .or(just("+").to(ArrowHead::Nested))
    }

    fn arrow_direction<'src>() -> impl Parser<'src, &'src str, ArrowDirection> + Clone {
        text::keyword("left")
            .or(text::keyword("le"))
            .or(text::keyword("l"))
            .to(ArrowDirection::Left)
            .or(text::keyword("right")
                .or(text::keyword("ri"))
                .or(text::keyword("r"))
                .to(ArrowDirection::Right))
            .or(text::keyword("up").or(text::keyword("u")).to(ArrowDirection::Up))
            .or(text::keyword("down")
                .or(text::keyword("do"))
                .or(text::keyword("d"))
                .to(ArrowDirection::Down))
    }

    /// Arrow such as `<|--`, `..>`, `-up->`, `*-[hidden]-`, `o.."1"`
    fn arrow_parser<'src>() -> impl Parser<'src, &'src str, Arrow> + Clone {
        let line = one_of("-.");

        let bracket = just('[')
            .ignore_then(none_of(']').repeated().to_slice())
            .then_ignore(just(']'))
            .map(|s: &str| s.trim().to_string());

        let body = line
            .clone()
            .repeated()
            .at_least(1)
            .collect::<String>()
            .then(bracket.or_not())
            .then(Self::arrow_direction().or_not())
            .then(line.repeated().collect::<String>());

        Self::arrow_head_left()
            .or_not()
            .then(body)
            .then(Self::arrow_head_right().or_not())
            .map(
                |((left_head, (((before, bracket), direction), after)), right_head)| {
                    let mut arrow = Arrow {
                        left_head,
                        right_head,
                        line: if before.contains('.') || after.contains('.') {
                            LineStyle::Dashed
                        } else {
                            LineStyle::Solid
                        },
                        direction,
                        hidden: false,
                        style: None,
                    };
                    if let Some(bracket) = bracket {
                        arrow.apply_bracket(&bracket);
                    }
                    arrow
                },
            )
    }

    /// `Left ["card"] arrow ["card"] Right [: label]`
    fn relationship_parser<'src>() -> impl Parser<'src, &'src str, Relationship> + Clone {
        let ws = inline_whitespace();
        let endpoint = Self::name_token().map(NameToken::into_string);

        let left = endpoint
            .clone()
            .then_ignore(ws.clone())
            .then(quoted_string().then_ignore(ws.clone()).or_not());

        // A quoted right side is a cardinality only when another name follows it
        let right = quoted_string()
            .then_ignore(ws.clone())
            .then(endpoint.clone())
            .map(|(card, name)| (Some(card), name))
            .or(endpoint.map(|name| (None, name)));

        let label = just(':').ignore_then(rest_of_line());

        left.then(Self::arrow_parser())
            .then_ignore(ws.clone())
            .then(right)
            .then_ignore(ws.clone())
            .then(label.or_not())
            .map(
                |((((left, left_cardinality), arrow), (right_cardinality, right)), label)| {
                    let mut rel = Relationship::new(
                        left,
                        right,
                        RelationshipKind::classify(arrow.left_head, arrow.right_head, arrow.line),
                    );
                    rel.left_head = arrow.left_head;
                    rel.right_head = arrow.right_head;
                    rel.line = arrow.line;
                    rel.direction = arrow.direction;
                    rel.hidden = arrow.hidden;
                    rel.style = arrow.style;
                    rel.left_cardinality = left_cardinality;
                    rel.right_cardinality = right_cardinality;
                    if let Some((text, direction)) = label.and_then(|l| split_label(&l)) {
                        rel.label = Some(text);
                        rel.label_direction = direction;
                    }
                    rel
                },
            )
    }

    /// `Order : +total() : Money`
    fn member_declaration_parser<'src>() -> impl Parser<'src, &'src str, Statement> + Clone {
        Self::name_token()
            .map(NameToken::into_string)
            .then_ignore(inline_whitespace())
            .then_ignore(just(':'))
            .then(rest_of_line())
            .filter(|(_, text): &(String, String)| !text.is_empty())
            .map(|(class, text)| Statement::Member { class, text })
    }
}

impl Default for ChumskyClassParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoded arrow, before it is attached to endpoints
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    pub left_head: Option<ArrowHead>,
    pub right_head: Option<ArrowHead>,
    pub line: LineStyle,
    pub direction: Option<ArrowDirection>,
    pub hidden: bool,
    pub style: Option<String>,
}

impl Arrow {
    /// Apply `[hidden]`, `[dashed]`, `[#red,bold]` style brackets
    fn apply_bracket(&mut self, bracket: &str) {
        let mut rest = Vec::new();
        for part in bracket.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part {
                "hidden" => self.hidden = true,
                "dashed" | "dotted" => {
                    self.line = LineStyle::Dashed;
                    rest.push(part);
                }
                _ => rest.push(part),
            }
        }
        if !rest.is_empty() {
            self.style = Some(rest.join(","));
        }
    }
}

fn attached_note(position: NotePosition, target: Option<String>, text: Option<String>) -> ParsedNote {
    match text {
        Some(text) => ParsedNote::Inline(Note {
            alias: None,
            text,
            position: Some(position),
            target,
        }),
        None => ParsedNote::Open(Note {
            alias: None,
            text: String::new(),
            position: Some(position),
            target,
        }),
    }
}

/// Strip a `<` / `>` reading-direction marker from a relationship label
fn split_label(label: &str) -> Option<(String, Option<LabelDirection>)> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    if let Some(rest) = label.strip_prefix("< ") {
        return Some((rest.trim().to_string(), Some(LabelDirection::Backward)));
    }
    if let Some(rest) = label.strip_suffix(" >") {
        return Some((rest.trim().to_string(), Some(LabelDirection::Forward)));
    }
    Some((label.to_string(), None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(input: &str) -> ParsedClass {
        match ChumskyClassParser::new().parse_statement(input).unwrap() {
            Statement::Class(class) => class,
            other => panic!("Expected class statement, got {:?}", other),
        }
    }

    fn relationship(input: &str) -> Relationship {
        match ChumskyClassParser::new().parse_statement(input).unwrap() {
            Statement::Relationship(rel) => rel,
            other => panic!("Expected relationship statement, got {:?}", other),
        }
    }

    fn note(input: &str) -> ParsedNote {
        match ChumskyClassParser::new().parse_statement(input).unwrap() {
            Statement::Note(note) => note,
            other => panic!("Expected note statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_simple_class() {
        let parsed = class("class Animal");
        assert_eq!(parsed.class.name, "Animal");
        assert_eq!(parsed.class.class_kind, ClassKind::Class);
        assert_eq!(parsed.body, BodyStart::None);
    }

    #[test]
    fn test_parse_class_kinds() {
        assert_eq!(class("abstract class Shape").class.class_kind, ClassKind::Abstract);
        assert_eq!(class("abstract Shape").class.class_kind, ClassKind::Abstract);
        assert_eq!(class("interface Drawable").class.class_kind, ClassKind::Interface);
        assert_eq!(class("enum Color").class.class_kind, ClassKind::Enum);
        assert_eq!(class("annotation Audited").class.class_kind, ClassKind::Annotation);
        assert_eq!(class("entity Customer").class.class_kind, ClassKind::Entity);
    }

    #[test]
    fn test_parse_class_body_start() {
        assert_eq!(class("class Animal {").body, BodyStart::Open(None));
        assert_eq!(class("class Animal{").body, BodyStart::Open(None));
        assert_eq!(class("class Animal {}").body, BodyStart::Closed(None));
        assert_eq!(
            class("class Animal { +name: String }").body,
            BodyStart::Closed(Some("+name: String".to_string()))
        );
    }

    #[test]
    fn test_parse_class_alias_and_title() {
        let parsed = class("class \"Customer Account\" as Account");
        assert_eq!(parsed.class.name, "Account");
        assert_eq!(parsed.class.title.as_deref(), Some("Customer Account"));

        let parsed = class("class Account as \"Customer Account\"");
        assert_eq!(parsed.class.name, "Account");
        assert_eq!(parsed.class.title.as_deref(), Some("Customer Account"));

        let parsed = class("class \"Plain Title\"");
        assert_eq!(parsed.class.name, "Plain Title");
        assert!(parsed.class.title.is_none());
    }

    #[test]
    fn test_parse_class_generics_stereotypes_color() {
        let parsed = class("class Repository<T, ID> <<Service>> <<(S,#FF7700) Spring>> #pink {");
        assert_eq!(parsed.class.generics, vec!["T", "ID"]);
        assert_eq!(parsed.class.stereotypes.len(), 2);
        assert_eq!(parsed.class.stereotypes[0].name, "Service");
        assert_eq!(parsed.class.stereotypes[1].name, "Spring");
        assert_eq!(parsed.class.stereotypes[1].spot.as_deref(), Some("S,#FF7700"));
        assert_eq!(parsed.class.color.as_deref(), Some("#pink"));
        assert_eq!(parsed.body, BodyStart::Open(None));
    }

    #[test]
    fn test_parse_nested_generics() {
        let parsed = class("class Cache<K, List<V>>");
        assert_eq!(parsed.class.generics, vec!["K", "List<V>"]);
    }

    #[test]
    fn test_parse_edatatype_stereotype() {
        let parsed = class("class EString << (D,orchid) EDataType>>");
        assert_eq!(parsed.class.stereotypes[0].name, "EDataType");
        assert_eq!(parsed.class.stereotypes[0].spot.as_deref(), Some("D,orchid"));
    }

    #[test]
    fn test_parse_generic_supertypes() {
        let parsed =
            class("class ArrayList<E> extends AbstractList<E> implements List<E>, RandomAccess {");
        assert_eq!(parsed.class.generics, vec!["E"]);
        assert_eq!(parsed.class.extends, vec!["AbstractList<E>"]);
        assert_eq!(parsed.class.implements, vec!["List<E>", "RandomAccess"]);
        assert_eq!(parsed.body, BodyStart::Open(None));

        let parsed = class("class B implements Comparable<B>");
        assert_eq!(parsed.class.implements, vec!["Comparable<B>"]);

        let parsed = class("class Cache extends Base<Map<K, V>>");
        assert_eq!(parsed.class.extends, vec!["Base<Map<K, V>>"]);
    }

    #[test]
    fn test_parse_extends_implements() {
        let parsed = class("class ArrayList<E> extends AbstractList implements List, RandomAccess {");
        assert_eq!(parsed.class.generics, vec!["E"]);
        assert_eq!(parsed.class.extends, vec!["AbstractList"]);
        assert_eq!(parsed.class.implements, vec!["List", "RandomAccess"]);
    }

    #[test]
    fn test_parse_inheritance() {
        let rel = relationship("Animal <|-- Dog");
        assert_eq!(rel.left, "Animal");
        assert_eq!(rel.right, "Dog");
        assert_eq!(rel.left_head, Some(ArrowHead::Extension));
        assert_eq!(rel.right_head, None);
        assert_eq!(rel.relation_kind, RelationshipKind::Inheritance);
    }

    #[test]
    fn test_parse_realization() {
        let rel = relationship("Shape ..|> Drawable");
        assert_eq!(rel.line, LineStyle::Dashed);
        assert_eq!(rel.right_head, Some(ArrowHead::Extension));
        assert_eq!(rel.relation_kind, RelationshipKind::Realization);
    }

    #[test]
    fn test_parse_composition_and_aggregation() {
        assert_eq!(
            relationship("Person *-- Heart").relation_kind,
            RelationshipKind::Composition
        );
        assert_eq!(
            relationship("Library o-- Book").relation_kind,
            RelationshipKind::Aggregation
        );
    }

    #[test]
    fn test_parse_dependency_without_spaces() {
        let rel = relationship("Client..>Service");
        assert_eq!(rel.left, "Client");
        assert_eq!(rel.right, "Service");
        assert_eq!(rel.relation_kind, RelationshipKind::Dependency);
    }

    #[test]
    fn test_parse_cardinalities_and_label() {
        let rel = relationship("Customer \"1\" --> \"*\" Order : places");
        assert_eq!(rel.left_cardinality.as_deref(), Some("1"));
        assert_eq!(rel.right_cardinality.as_deref(), Some("*"));
        assert_eq!(rel.label.as_deref(), Some("places"));
        assert_eq!(rel.label_direction, None);
        assert_eq!(rel.relation_kind, RelationshipKind::Association);
    }

    #[test]
    fn test_parse_ecore_style_reference() {
        let rel = relationship("Library \"books 0..*\" *--> Book");
        assert_eq!(rel.left_cardinality.as_deref(), Some("books 0..*"));
        assert_eq!(rel.left_head, Some(ArrowHead::Composition));
        assert_eq!(rel.right_head, Some(ArrowHead::Arrow));
        assert_eq!(rel.relation_kind, RelationshipKind::Composition);
    }

    #[test]
    fn test_parse_quoted_right_endpoint() {
        let rel = relationship("Order --> \"Line Item\"");
        assert_eq!(rel.right, "Line Item");
        assert!(rel.right_cardinality.is_none());
    }

    #[test]
    fn test_parse_label_direction() {
        let rel = relationship("Driver - Car : drives >");
        assert_eq!(rel.label.as_deref(), Some("drives"));
        assert_eq!(rel.label_direction, Some(LabelDirection::Forward));
        assert_eq!(rel.relation_kind, RelationshipKind::Link);

        let rel = relationship("Car -- Driver : < drives");
        assert_eq!(rel.label_direction, Some(LabelDirection::Backward));
    }

    #[test]
    fn test_parse_crowfoot_multiplicities() {
        let rel = relationship("Customer }o--o{ Order");
        assert_eq!(rel.left_head, Some(ArrowHead::ZeroOrMany));
        assert_eq!(rel.right_head, Some(ArrowHead::ZeroOrMany));
        assert_eq!(rel.relation_kind, RelationshipKind::Association);

        let rel = relationship("Person |o--o| Passport");
        assert_eq!(rel.left_head, Some(ArrowHead::ZeroOrOne));
        assert_eq!(rel.right_head, Some(ArrowHead::ZeroOrOne));

        let rel = relationship("Order ||..|{ Line");
        assert_eq!(rel.left_head, Some(ArrowHead::ExactlyOne));
        assert_eq!(rel.right_head, Some(ArrowHead::OneOrMany));
        assert_eq!(rel.relation_kind, RelationshipKind::Dependency);

        let rel = relationship("Team }|-- Member");
        assert_eq!(rel.left_head, Some(ArrowHead::OneOrMany));
        assert_eq!(rel.right_head, None);

        // Plain heads still win when no bar or brace follows
        let rel = relationship("Car o-- Wheel");
        assert_eq!(rel.left_head, Some(ArrowHead::Aggregation));
        let rel = relationship("A --{ B");
        assert_eq!(rel.right_head, Some(ArrowHead::Crowfoot));
    }

    #[test]
    fn test_parse_arrow_direction_and_hidden() {
        let rel = relationship("A -up-> B");
        assert_eq!(rel.direction, Some(ArrowDirection::Up));
        assert_eq!(rel.right_head, Some(ArrowHead::Arrow));

        let rel = relationship("A -[hidden]- B");
        assert!(rel.hidden);
        assert!(rel.style.is_none());

        let rel = relationship("A -[#red,dashed]-> B");
        assert_eq!(rel.line, LineStyle::Dashed);
        assert_eq!(rel.style.as_deref(), Some("#red,dashed"));
        assert_eq!(rel.relation_kind, RelationshipKind::Dependency);
    }

    #[test]
    fn test_parse_qualified_endpoints() {
        let rel = relationship("net.model.Order --> net.model.Item");
        assert_eq!(rel.left, "net.model.Order");
        assert_eq!(rel.right, "net.model.Item");
    }

    #[test]
    fn test_parse_package() {
        let stmt = ChumskyClassParser::new()
            .parse_statement("package \"Domain Model\" as model <<Folder>> {")
            .unwrap();
        match stmt {
            Statement::Package(parsed) => {
                assert_eq!(parsed.package.name, "model");
                assert_eq!(parsed.package.title.as_deref(), Some("Domain Model"));
                assert_eq!(parsed.package.stereotypes[0].name, "Folder");
                assert!(!parsed.package.namespace);
                assert!(!parsed.closed);
            }
            other => panic!("Expected package, got {:?}", other),
        }

        match ChumskyClassParser::new()
            .parse_statement("namespace net.dummy {}")
            .unwrap()
        {
            Statement::Package(parsed) => {
                assert_eq!(parsed.package.name, "net.dummy");
                assert!(parsed.package.namespace);
                assert!(parsed.closed);
            }
            other => panic!("Expected package, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_together() {
        assert_eq!(
            ChumskyClassParser::new().parse_statement("together {").unwrap(),
            Statement::Together
        );
    }

    #[test]
    fn test_parse_notes() {
        match note("note \"Shared by all\" as N1") {
            ParsedNote::Inline(n) => {
                assert_eq!(n.text, "Shared by all");
                assert_eq!(n.alias.as_deref(), Some("N1"));
            }
            other => panic!("Expected inline note, got {:?}", other),
        }

        match note("note left of Order : created on checkout") {
            ParsedNote::Inline(n) => {
                assert_eq!(n.position, Some(NotePosition::Left));
                assert_eq!(n.target.as_deref(), Some("Order"));
                assert_eq!(n.text, "created on checkout");
            }
            other => panic!("Expected inline note, got {:?}", other),
        }

        match note("note top of Order") {
            ParsedNote::Open(n) => {
                assert_eq!(n.position, Some(NotePosition::Top));
                assert_eq!(n.target.as_deref(), Some("Order"));
            }
            other => panic!("Expected open note, got {:?}", other),
        }

        match note("note as N2") {
            ParsedNote::Open(n) => assert_eq!(n.alias.as_deref(), Some("N2")),
            other => panic!("Expected open note, got {:?}", other),
        }

        match note("note on link : weak") {
            ParsedNote::Inline(n) => {
                assert_eq!(n.position, Some(NotePosition::OnLink));
                assert!(n.target.is_none());
            }
            other => panic!("Expected inline note, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_member_declaration() {
        let stmt = ChumskyClassParser::new()
            .parse_statement("Order : +total() : Money")
            .unwrap();
        assert_eq!(
            stmt,
            Statement::Member {
                class: "Order".to_string(),
                text: "+total() : Money".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_garbage() {
        let parser = ChumskyClassParser::new();
        assert!(parser.parse_statement("participant Alice").is_err());
        assert!(parser.parse_statement("Alice -> ").is_err());
        assert!(parser.parse_statement("Order :").is_err());
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(split_top_level("a, b ,c", ','), vec!["a", "b", "c"]);
        assert_eq!(
            split_top_level("m: Map<K, V>, n: int", ','),
            vec!["m: Map<K, V>", "n: int"]
        );
        assert!(split_top_level("  ", ',').is_empty());
    }
}
