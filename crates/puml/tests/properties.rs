//! Property tests for parser robustness and output path purity

use std::path::{Path, PathBuf};

use proptest::prelude::*;
use puml::{json_output_path, parse};

const ARROWS: &[&str] = &[
    "-->", "<|--", "..|>", "*--", "o--", "..>", "--", "..", "<-->", "-up->", "-[hidden]-",
];

fn class_name() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{0,8}"
}

fn relationship_line() -> impl Strategy<Value = String> {
    (class_name(), 0..ARROWS.len(), class_name())
        .prop_map(|(left, arrow, right)| format!("{} {} {}", left, ARROWS[arrow], right))
}

proptest! {
    #[test]
    fn parser_never_panics(input in "\\PC*") {
        let _ = parse(&input);
    }

    #[test]
    fn parser_never_panics_inside_block(body in "[ -~\t\n]{0,200}") {
        let _ = parse(&format!("@startuml\n{}\n@enduml", body));
    }

    #[test]
    fn generated_relationships_parse(lines in prop::collection::vec(relationship_line(), 0..20)) {
        let input = format!("@startuml\n{}\n@enduml", lines.join("\n"));
        let diagrams = parse(&input).unwrap();
        prop_assert_eq!(diagrams.len(), 1);
        prop_assert_eq!(diagrams[0].relationship_count(), lines.len());
    }

    #[test]
    fn generated_classes_parse(names in prop::collection::vec(class_name(), 0..20)) {
        let body: Vec<String> = names.iter().map(|n| format!("class {} {{\n  +id : Long\n}}", n)).collect();
        let input = format!("@startuml\n{}\n@enduml", body.join("\n"));
        let diagrams = parse(&input).unwrap();
        prop_assert_eq!(diagrams[0].class_count(), names.len());
    }

    #[test]
    fn block_count_matches(count in 0usize..8) {
        let input = "@startuml\nclass A\n@enduml\n".repeat(count);
        prop_assert_eq!(parse(&input).unwrap().len(), count);
    }

    #[test]
    fn output_path_replaces_only_last_extension(
        dir in "[a-z]{1,8}",
        stem in "[a-z]{1,8}(\\.[a-z0-9]{1,3}){0,2}",
        ext in "[a-z]{1,5}",
    ) {
        let input = PathBuf::from(&dir).join(format!("{}.{}", stem, ext));
        let output = json_output_path(&input);
        prop_assert_eq!(output.parent(), Some(Path::new(&dir)));
        prop_assert_eq!(output.file_name().unwrap().to_str().unwrap(), format!("{}.json", stem));
        prop_assert_eq!(json_output_path(&input), output);
    }

    #[test]
    fn output_path_without_extension_appends_json(stem in "[a-z]{1,12}") {
        let output = json_output_path(Path::new(&stem));
        prop_assert_eq!(output, PathBuf::from(format!("{}.json", stem)));
    }
}
