use proptest::prelude::*;
use reqtrace_core::prelude::*;
use reqtrace_core::ForwardMatrix;

fn build(files: &[(&str, String)]) -> Graph {
    let parser = RecordParser::new();
    let records = files
        .iter()
        .map(|(loc, text)| parser.parse(text, &SourceLocation::new(*loc)))
        .collect();
    GraphBuilder::default().build(records)
}

proptest! {
    #[test]
    fn prop_block_links_keep_multiplicity(
        targets in proptest::collection::vec("[A-Z]{2,4}-[0-9]{1,3}", 0..12)
    ) {
        let mut text = String::from("SWD-1:\n  links:\n");
        for t in &targets {
            text.push_str(&format!("    - {t}\n"));
        }
        let record = RecordParser::new().parse(&text, &SourceLocation::new("swd/SWD-1.yml"));
        let parsed: Vec<&str> = record.edges.iter().map(|e| e.target.as_str()).collect();
        prop_assert_eq!(parsed, targets.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn prop_inline_links_keep_multiplicity(
        targets in proptest::collection::vec("[A-Z]{2,4}-[0-9]{1,3}", 1..12)
    ) {
        let text = format!("SWD-1:\n  links: [{}]\n", targets.join(", "));
        let record = RecordParser::new().parse(&text, &SourceLocation::new("swd/SWD-1.yml"));
        prop_assert_eq!(record.edges.len(), targets.len());
    }

    #[test]
    fn prop_broken_targets_are_undefined_requirement_refs(
        defined in proptest::collection::btree_set("R-[0-9]{1,2}", 1..8),
        linked in proptest::collection::vec("R-[0-9]{1,2}", 0..16)
    ) {
        let defined: Vec<String> = defined.into_iter().collect();
        let mut files: Vec<(String, String)> = defined
            .iter()
            .map(|id| (format!("req/{id}.yml"), format!("{id}:\n  text: x\n")))
            .collect();
        files.push((
            "src/SRC-1.yml".to_string(),
            format!("SRC-1:\n  links: [{}]\n", linked.join(", ")),
        ));
        let files: Vec<(&str, String)> =
            files.iter().map(|(l, t)| (l.as_str(), t.clone())).collect();

        let graph = build(&files);
        let result = ConsistencyAnalyzer::new().analyze(&graph, ScanTally::from_records(files.len()));

        for target in &result.broken_targets {
            prop_assert!(!defined.contains(target));
            prop_assert!(linked.contains(target));
        }
        for target in &linked {
            prop_assert_eq!(result.broken_targets.contains(target), !defined.contains(target));
        }
    }

    #[test]
    fn prop_orphans_are_exactly_unlinked_records(
        ids in proptest::collection::btree_set("N-[0-9]{1,2}", 2..10),
        pick in proptest::collection::vec(any::<bool>(), 10)
    ) {
        let ids: Vec<String> = ids.into_iter().collect();
        let linked: Vec<&str> = ids
            .iter()
            .zip(&pick)
            .filter(|(_, p)| **p)
            .map(|(id, _)| id.as_str())
            .collect();
        let mut files: Vec<(String, String)> = ids
            .iter()
            .map(|id| (format!("n/{id}.yml"), format!("{id}:\n")))
            .collect();
        files.push(("h/HUB.yml".to_string(), format!("HUB:\n  links: [{}]\n", linked.join(", "))));
        let files: Vec<(&str, String)> =
            files.iter().map(|(l, t)| (l.as_str(), t.clone())).collect();

        let graph = build(&files);
        let result = ConsistencyAnalyzer::new().analyze(&graph, ScanTally::from_records(files.len()));

        for id in &ids {
            let expected = !linked.contains(&id.as_str());
            prop_assert_eq!(result.orphan_ids.contains(&RecordId::new(id.as_str())), expected);
        }
        prop_assert_eq!(
            result.orphan_ids.contains(&RecordId::new("HUB")),
            linked.is_empty()
        );
    }
}

#[test]
fn test_three_level_chain_scenario() {
    let graph = build(&[
        ("urd/URD-1.yml", "URD-1:\n  header: root\n".to_string()),
        ("srd/SRD-1.yml", "SRD-1:\n  links: [URD-1]\n".to_string()),
        (
            "swd/SWD-1.yml",
            "SWD-1:\n  links: [SRD-1, \"artifacts/tests/report.xml\"]\n".to_string(),
        ),
    ]);

    let forward = MatrixProjector::new().forward(&graph);
    assert_eq!(forward.rows().len(), 4);
    assert_eq!(forward.link_count(), 3);
    assert_eq!(
        ForwardMatrix::cells(&forward.rows()[0]),
        ["URD-1", "", "", "urd/URD-1.yml"]
    );

    let artifact = &graph.edges()[2];
    assert_eq!(artifact.edge.target, "artifacts/tests/report.xml");
    assert_eq!(artifact.class, TargetClass::ArtifactRef);

    let result = ConsistencyAnalyzer::new().analyze(&graph, ScanTally::from_records(3));
    assert!(result.broken_targets.is_empty());
    assert!(result.orphan_ids.is_empty());
    assert_eq!(result.counts.links_extracted, 3);
    assert_eq!(result.verdict(true), Verdict::Pass);
}

#[test]
fn test_projections_are_repeatable() {
    let files = [
        ("b/B-1.yml", "B-1:\n  links: [A-1, A-1]\n".to_string()),
        ("a/A-1.yml", "A-1:\n  ref: A-1\n".to_string()),
        ("C-1.yml", "links:\n  - B-1\n".to_string()),
    ];
    let projector = MatrixProjector::new();
    let first = projector.forward(&build(&files));
    let second = projector.forward(&build(&files));
    assert_eq!(first, second);

    let backward = projector.backward(&build(&files));
    assert_eq!(backward.pointing_at("A-1").count(), 3);
}
