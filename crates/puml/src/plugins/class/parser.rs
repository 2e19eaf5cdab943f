//! PlantUML class diagram parser
//!
//! Splits the input into `@startuml ... @enduml` blocks and turns each block
//! into a [`Diagram`]. Single statements are parsed by
//! [`ChumskyClassParser`]; block structure (class bodies, packages, notes,
//! comments, skipped directive blocks) is tracked here line by line.

use std::mem;

use anyhow::Result;
use tracing::{debug, span, trace, Level};

use super::chumsky_parser::{
    split_top_level, BodyStart, ChumskyClassParser, ParsedClass, ParsedNote, ParsedPackage,
    Statement,
};
use super::database::{
    Class, ClassKind, Comment, Diagram, Element, Member, MemberDeclaration, MemberKind, Modifier,
    Note, Package, Parameter, Visibility,
};
use crate::core::{DiagramError, Parser};

/// Class diagram parser for PlantUML text
pub struct PlantUmlParser {
    statements: ChumskyClassParser,
}

impl PlantUmlParser {
    pub fn new() -> Self {
        Self {
            statements: ChumskyClassParser::new(),
        }
    }
}

impl Default for PlantUmlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for PlantUmlParser {
    type Output = Diagram;

    fn parse(&self, input: &str) -> Result<Vec<Diagram>> {
        let parse_span = span!(Level::INFO, "parse_plantuml", input_len = input.len());
        let _enter = parse_span.enter();

        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        let mut diagrams = Vec::new();
        let mut block: Option<Block> = None;

        for (index, raw) in input.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            let column = raw.chars().take_while(|c| c.is_whitespace()).count() + 1;
            let lower = line.to_ascii_lowercase();

            match block.as_mut() {
                None => {
                    if let Some(rest) = lower.strip_prefix("@start") {
                        let kind: String = rest
                            .chars()
                            .take_while(|c| c.is_ascii_alphanumeric())
                            .collect();
                        if kind != "uml" {
                            return Err(DiagramError::UnknownDiagramType {
                                diagram_type: kind,
                            }
                            .into());
                        }
                        let name = block_name(&line["@startuml".len()..]);
                        debug!(line = line_no, name = ?name, "Opened @startuml block");
                        block = Some(Block::new(name, line_no));
                    } else if lower.starts_with("@end") {
                        return Err(DiagramError::parse_error(
                            format!("'{}' without matching @startuml", line),
                            line_no,
                            column,
                        )
                        .into());
                    } else if !line.is_empty() {
                        trace!(line = line_no, "Ignoring text outside @startuml block");
                    }
                }
                Some(current) => {
                    if lower == "@enduml" {
                        if let Some(finished) = block.take() {
                            let diagram = finished.finish()?;
                            debug!(
                                line = line_no,
                                elements = diagram.elements.len(),
                                "Closed @startuml block"
                            );
                            diagrams.push(diagram);
                        }
                    } else if lower.starts_with("@start") || lower.starts_with("@end") {
                        return Err(DiagramError::parse_error(
                            format!("'{}' inside an open @startuml block", line),
                            line_no,
                            column,
                        )
                        .into());
                    } else {
                        current.process(&self.statements, line, line_no, column)?;
                    }
                }
            }
        }

        if let Some(open) = block {
            return Err(DiagramError::parse_error(
                "missing @enduml for @startuml block",
                open.start_line,
                1,
            )
            .into());
        }

        debug!(diagram_count = diagrams.len(), "Parsed PlantUML input");
        Ok(diagrams)
    }

    fn name(&self) -> &'static str {
        "plantuml"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn can_parse(&self, input: &str) -> bool {
        input
            .trim_start_matches('\u{feff}')
            .lines()
            .any(|line| line.trim_start().to_ascii_lowercase().starts_with("@startuml"))
    }
}

/// `@startuml name` or `@startuml(id=name)`
fn block_name(rest: &str) -> Option<String> {
    let rest = rest.trim();
    let rest = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .map(|r| r.trim_start_matches("id=").trim())
        .unwrap_or(rest);
    (!rest.is_empty()).then(|| rest.to_string())
}

/// Grouping scope that elements are collected into
enum Scope {
    Package(Package),
    /// `together { }` adds nothing to the model
    Together,
}

/// What the next line of a block belongs to
enum Mode {
    Normal,
    /// Class declared without a brace; a lone `{` on the next line opens its body
    AwaitingBody(Class),
    ClassBody { class: Class, line: usize },
    Note { note: Note, lines: Vec<String>, line: usize },
    Title { lines: Vec<String>, line: usize },
    /// `legend`, `header`, `footer` blocks, skipped up to their end keyword
    Skip { until: &'static str, line: usize },
    Skinparam { depth: usize, line: usize },
}

struct OpenComment {
    lines: Vec<String>,
    line: usize,
}

/// State of one `@startuml` block while its lines are consumed
struct Block {
    diagram: Diagram,
    start_line: usize,
    scopes: Vec<(Scope, usize)>,
    mode: Mode,
    comment: Option<OpenComment>,
}

impl Block {
    fn new(name: Option<String>, start_line: usize) -> Self {
        Self {
            diagram: Diagram {
                name,
                ..Diagram::default()
            },
            start_line,
            scopes: Vec::new(),
            mode: Mode::Normal,
            comment: None,
        }
    }

    /// Append to the innermost package, or the diagram itself
    fn push(&mut self, element: Element) {
        let target = match self.scopes.iter_mut().rev().find_map(|(scope, _)| match scope {
            Scope::Package(package) => Some(&mut package.elements),
            Scope::Together => None,
        }) {
            Some(elements) => elements,
            None => &mut self.diagram.elements,
        };
        target.push(element);
    }

    fn process(
        &mut self,
        statements: &ChumskyClassParser,
        line: &str,
        line_no: usize,
        column: usize,
    ) -> Result<()> {
        if self.comment.is_some() {
            self.continue_comment(line);
            return Ok(());
        }

        if matches!(self.mode, Mode::AwaitingBody(_)) && !line.is_empty() && line != "{" {
            self.flush_pending_class();
        }

        if let Some(rest) = line.strip_prefix("/'") {
            match rest.find("'/") {
                Some(end) => self.emit_comment(rest[..end].trim().to_string()),
                None => {
                    self.comment = Some(OpenComment {
                        lines: vec![rest.trim().to_string()],
                        line: line_no,
                    })
                }
            }
            return Ok(());
        }

        match mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => self.statement(statements, line, line_no, column)?,
            Mode::AwaitingBody(class) => {
                if line == "{" {
                    self.mode = Mode::ClassBody {
                        class,
                        line: line_no,
                    };
                } else {
                    self.mode = Mode::AwaitingBody(class);
                }
            }
            Mode::ClassBody { mut class, line: start } => {
                if line == "}" {
                    trace!(class = %class.name, members = class.members.len(), "Closed class body");
                    self.push(Element::Class(class));
                } else {
                    add_body_line(&mut class, line);
                    self.mode = Mode::ClassBody { class, line: start };
                }
            }
            Mode::Note {
                mut note,
                mut lines,
                line: start,
            } => {
                if is_end_keyword(line, "endnote") {
                    note.text = lines.join("\n");
                    self.push(Element::Note(note));
                } else {
                    lines.push(line.to_string());
                    self.mode = Mode::Note {
                        note,
                        lines,
                        line: start,
                    };
                }
            }
            Mode::Title { mut lines, line: start } => {
                if is_end_keyword(line, "endtitle") {
                    self.diagram.title = Some(lines.join("\n"));
                } else {
                    lines.push(line.to_string());
                    self.mode = Mode::Title { lines, line: start };
                }
            }
            Mode::Skip { until, line: start } => {
                if !is_end_keyword(line, until) {
                    self.mode = Mode::Skip { until, line: start };
                }
            }
            Mode::Skinparam { depth, line: start } => {
                let opens = line.matches('{').count();
                let closes = line.matches('}').count();
                let depth = (depth + opens).saturating_sub(closes);
                if depth > 0 {
                    self.mode = Mode::Skinparam { depth, line: start };
                }
            }
        }
        Ok(())
    }

    fn statement(
        &mut self,
        statements: &ChumskyClassParser,
        line: &str,
        line_no: usize,
        column: usize,
    ) -> Result<()> {
        if line.is_empty() {
            return Ok(());
        }
        if let Some(text) = line.strip_prefix('\'') {
            self.emit_comment(text.trim().to_string());
            return Ok(());
        }
        if line == "}" {
            return self.close_scope(line_no, column);
        }
        if self.directive(line, line_no) {
            return Ok(());
        }

        let statement = statements.parse_statement(line).map_err(|e| {
            debug!(line = line_no, error = %e, "Statement rejected");
            DiagramError::parse_error(format!("unrecognized statement '{}'", line), line_no, column)
        })?;

        match statement {
            Statement::Class(ParsedClass { mut class, body }) => {
                trace!(line = line_no, class = %class.name, kind = ?class.class_kind, "Class declaration");
                match body {
                    BodyStart::None => self.mode = Mode::AwaitingBody(class),
                    BodyStart::Open(first) => {
                        if let Some(first) = first {
                            add_body_line(&mut class, &first);
                        }
                        self.mode = Mode::ClassBody {
                            class,
                            line: line_no,
                        };
                    }
                    BodyStart::Closed(content) => {
                        if let Some(content) = content {
                            for part in split_top_level(&content, ';') {
                                add_body_line(&mut class, &part);
                            }
                        }
                        self.push(Element::Class(class));
                    }
                }
            }
            Statement::Package(ParsedPackage { package, closed }) => {
                trace!(line = line_no, package = %package.name, "Package declaration");
                if closed {
                    self.push(Element::Package(package));
                } else {
                    self.scopes.push((Scope::Package(package), line_no));
                }
            }
            Statement::Together => self.scopes.push((Scope::Together, line_no)),
            Statement::Note(ParsedNote::Inline(note)) => self.push(Element::Note(note)),
            Statement::Note(ParsedNote::Open(note)) => {
                self.mode = Mode::Note {
                    note,
                    lines: Vec::new(),
                    line: line_no,
                }
            }
            Statement::Relationship(rel) => {
                trace!(line = line_no, left = %rel.left, right = %rel.right, kind = ?rel.relation_kind, "Relationship");
                self.push(Element::Relationship(rel));
            }
            Statement::Member { class, text } => {
                let member = parse_member(&text).ok_or_else(|| {
                    DiagramError::parse_error(
                        format!("invalid member '{}' for '{}'", text, class),
                        line_no,
                        column,
                    )
                })?;
                self.push(Element::Member(MemberDeclaration { class, member }));
            }
        }
        Ok(())
    }

    /// Accept and drop presentation directives. Returns false for anything else.
    fn directive(&mut self, line: &str, line_no: usize) -> bool {
        if line.starts_with('!') {
            trace!(line = line_no, "Skipping preprocessor directive");
            return true;
        }

        let keyword = line.split_whitespace().next().unwrap_or("");
        let rest = line[keyword.len()..].trim();

        match keyword {
            "title" => {
                if rest.is_empty() {
                    self.mode = Mode::Title {
                        lines: Vec::new(),
                        line: line_no,
                    };
                } else {
                    self.diagram.title = Some(rest.to_string());
                }
            }
            "skinparam" | "skinparamlocked" => {
                if line.ends_with('{') {
                    self.mode = Mode::Skinparam {
                        depth: 1,
                        line: line_no,
                    };
                }
            }
            "legend" => {
                self.mode = Mode::Skip {
                    until: "endlegend",
                    line: line_no,
                }
            }
            "header" | "footer" => {
                let only_alignment = rest
                    .split_whitespace()
                    .all(|w| matches!(w, "left" | "right" | "center"));
                if only_alignment {
                    self.mode = Mode::Skip {
                        until: if keyword == "header" {
                            "endheader"
                        } else {
                            "endfooter"
                        },
                        line: line_no,
                    };
                }
            }
            "hide" | "show" | "remove" | "restore" | "scale" | "set" | "caption"
            | "allowmixing" | "allow_mixing" | "skin" | "mainframe" => {}
            "left" | "top"
                if line == "left to right direction" || line == "top to bottom direction" => {}
            _ => return false,
        }

        trace!(line = line_no, directive = keyword, "Skipping directive");
        true
    }

    fn close_scope(&mut self, line_no: usize, column: usize) -> Result<()> {
        match self.scopes.pop() {
            Some((Scope::Package(package), _)) => {
                debug!(package = %package.name, elements = package.elements.len(), "Closed package");
                self.push(Element::Package(package));
                Ok(())
            }
            Some((Scope::Together, _)) => Ok(()),
            None => Err(DiagramError::parse_error("unexpected '}'", line_no, column).into()),
        }
    }

    fn flush_pending_class(&mut self) {
        if let Mode::AwaitingBody(class) = mem::replace(&mut self.mode, Mode::Normal) {
            self.push(Element::Class(class));
        }
    }

    fn continue_comment(&mut self, line: &str) {
        let Some(mut comment) = self.comment.take() else {
            return;
        };
        match line.find("'/") {
            Some(end) => {
                comment.lines.push(line[..end].trim().to_string());
                let text = comment
                    .lines
                    .iter()
                    .map(String::as_str)
                    .filter(|l| !l.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n");
                self.emit_comment(text);
            }
            None => {
                comment.lines.push(line.to_string());
                self.comment = Some(comment);
            }
        }
    }

    /// Comments inside class bodies, notes and skipped blocks are dropped
    fn emit_comment(&mut self, text: String) {
        if matches!(self.mode, Mode::Normal) {
            self.push(Element::Comment(Comment { text }));
        } else {
            trace!("Dropping comment inside a nested construct");
        }
    }

    fn finish(mut self) -> Result<Diagram> {
        if let Some(comment) = &self.comment {
            return Err(
                DiagramError::parse_error("unterminated block comment", comment.line, 1).into(),
            );
        }

        let unclosed = match mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => None,
            Mode::AwaitingBody(class) => {
                self.push(Element::Class(class));
                None
            }
            Mode::ClassBody { class, line } => {
                Some((format!("body of class '{}' is not closed", class.name), line))
            }
            Mode::Note { line, .. } => Some(("note is not closed with 'end note'".to_string(), line)),
            Mode::Title { line, .. } => {
                Some(("title is not closed with 'end title'".to_string(), line))
            }
            Mode::Skip { until, line } => Some((format!("missing '{}'", until), line)),
            Mode::Skinparam { line, .. } => {
                Some(("skinparam block is not closed".to_string(), line))
            }
        };
        if let Some((message, line)) = unclosed {
            return Err(DiagramError::parse_error(message, line, 1).into());
        }

        if let Some((scope, line)) = self.scopes.last() {
            let message = match scope {
                Scope::Package(package) => format!("package '{}' is not closed", package.name),
                Scope::Together => "together group is not closed".to_string(),
            };
            return Err(DiagramError::parse_error(message, *line, 1).into());
        }

        Ok(self.diagram)
    }
}

/// `end note`, `endnote`, `end legend`, ... compared without whitespace
fn is_end_keyword(line: &str, keyword: &str) -> bool {
    line.split_whitespace()
        .collect::<String>()
        .eq_ignore_ascii_case(keyword)
}

/// `--`, `..`, `==`, `__` lines, optionally with a caption (`-- private --`)
fn is_separator(line: &str) -> bool {
    let Some(first) = line.chars().next() else {
        return false;
    };
    if !"-.=_".contains(first) {
        return false;
    }
    let rest = line.trim_start_matches(first);
    line.len() - rest.len() >= 2 && (rest.is_empty() || rest.starts_with(char::is_whitespace))
}

fn add_body_line(class: &mut Class, line: &str) {
    let line = line.trim();
    if line.is_empty() || line.starts_with('\'') || is_separator(line) {
        return;
    }

    if class.class_kind == ClassKind::Enum && !line.contains('(') && !line.contains(':') {
        for constant in line
            .split(',')
            .map(|c| c.trim().trim_end_matches(';').trim())
            .filter(|c| !c.is_empty())
        {
            class.add_member(Member::attribute(constant));
        }
        return;
    }

    match parse_member(line) {
        Some(member) => class.add_member(member),
        None => trace!(class = %class.name, line, "Skipping empty member line"),
    }
}

/// Consume leading `{static}`, `{abstract}`, `{classifier}`, `{field}`, `{method}`
fn take_modifiers<'a>(
    mut rest: &'a str,
    modifiers: &mut Vec<Modifier>,
    kind: &mut Option<MemberKind>,
) -> &'a str {
    while let Some(inner) = rest.strip_prefix('{') {
        let Some(close) = inner.find('}') else {
            break;
        };
        match inner[..close].trim().to_ascii_lowercase().as_str() {
            "static" | "classifier" => modifiers.push(Modifier::Static),
            "abstract" => modifiers.push(Modifier::Abstract),
            "field" => *kind = Some(MemberKind::Field),
            "method" => *kind = Some(MemberKind::Method),
            _ => break,
        }
        rest = inner[close + 1..].trim_start();
    }
    rest
}

/// Parse a member line such as `-id : Long`, `+{static} of(x : int) : Order`
/// or Java-style `String name`.
pub(crate) fn parse_member(text: &str) -> Option<Member> {
    let mut modifiers = Vec::new();
    let mut forced_kind = None;

    let mut rest = take_modifiers(text.trim(), &mut modifiers, &mut forced_kind);

    let visibility = rest.chars().next().and_then(Visibility::from_char);
    if let Some(v) = visibility {
        rest = rest[v.to_char().len_utf8()..].trim_start();
    }
    rest = take_modifiers(rest, &mut modifiers, &mut forced_kind);

    // Classifier suffix (* or $)
    if let Some(stripped) = rest.strip_suffix('$') {
        modifiers.push(Modifier::Static);
        rest = stripped.trim_end();
    } else if let Some(stripped) = rest.strip_suffix('*') {
        modifiers.push(Modifier::Abstract);
        rest = stripped.trim_end();
    }

    if rest.is_empty() {
        return None;
    }

    let is_method = match forced_kind {
        Some(kind) => kind == MemberKind::Method,
        None => rest.contains('('),
    };

    let mut member = if is_method {
        parse_method(rest)
    } else {
        parse_attribute(rest)
    };
    if member.name.is_empty() {
        return None;
    }

    member.visibility = visibility;
    for modifier in modifiers {
        member = member.with_modifier(modifier);
    }
    Some(member)
}

fn parse_method(rest: &str) -> Member {
    let Some(open) = rest.find('(') else {
        return Member::method(rest);
    };

    let head = rest[..open].trim();
    let (params, after) = match rest.rfind(')').filter(|&close| close > open) {
        Some(close) => (&rest[open + 1..close], rest[close + 1..].trim()),
        None => (&rest[open + 1..], ""),
    };

    let return_type = after
        .strip_prefix(':')
        .map(str::trim)
        .filter(|t| !t.is_empty());

    // Java-style `int size()`
    let (name, leading_type) = match head.rsplit_once(char::is_whitespace) {
        Some((ty, name)) => (name.trim(), Some(ty.trim())),
        None => (head, None),
    };

    let mut member = Member::method(name);
    member.member_type = return_type.or(leading_type).map(str::to_string);
    member.parameters = split_top_level(params, ',')
        .iter()
        .map(|p| parse_parameter(p))
        .collect();
    member
}

fn parse_parameter(text: &str) -> Parameter {
    if let Some((name, ty)) = text.split_once(':') {
        let ty = ty.trim();
        let param = Parameter::new(name.trim());
        return if ty.is_empty() { param } else { param.with_type(ty) };
    }
    match text.rsplit_once(char::is_whitespace) {
        Some((ty, name)) => Parameter::new(name.trim()).with_type(ty.trim()),
        None => Parameter::new(text.trim()),
    }
}

fn parse_attribute(rest: &str) -> Member {
    if let Some((name, ty)) = rest.split_once(':') {
        let ty = ty.trim();
        let member = Member::attribute(name.trim());
        return if ty.is_empty() {
            member
        } else {
            member.with_type(ty)
        };
    }
    // Java-style `String name`
    match rest.rsplit_once(char::is_whitespace) {
        Some((ty, name)) => Member::attribute(name.trim()).with_type(ty.trim()),
        None => Member::attribute(rest),
    }
}
