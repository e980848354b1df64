use chrono::Utc;
use namebase::extract::{parse_category, parse_markup};
use namebase::pipeline::apply_facts;
use namebase::{
    Bucket, FactRecord, FactSet, FactValue, LanguageTable, MemoryNameStore, NameStore, RunStats,
    classify,
};

const SAMPLE_NAMES: [&str; 14] = [
    "Smith", "noah", "Xavier", "Quinn", "Uma", "Élodie", "Ξένια", "Борис", "さくら", "サクラ", "李",
    "שרה", "-Ann", "4ever",
];

#[test]
fn classify_is_deterministic() {
    for name in SAMPLE_NAMES {
        assert_eq!(classify(name), classify(name), "{name}");
        assert_eq!(classify(name).file_stem(), classify(name).file_stem());
    }
}

#[test]
fn classify_uses_only_the_leading_character() {
    for name in SAMPLE_NAMES {
        let leading: String = name.chars().take(1).collect();
        assert_eq!(classify(name), classify(&leading), "{name}");
    }
}

#[test]
fn documented_buckets() {
    let latin = |letter| Bucket::Letter {
        alphabet: "Latin",
        letter,
    };
    assert_eq!(classify("Smith"), latin("S"));
    assert_eq!(classify("Noah"), latin("NO"));
    assert_eq!(classify("Xavier"), latin("XYZ"));
    assert_eq!(classify("Élodie"), latin("E"));
    assert_eq!(classify("Ξένια"), Bucket::Single("Greek"));
    assert_eq!(classify("李"), Bucket::Single("CJK"));
    assert_eq!(classify("李").file_stem(), "CJK");
    assert_eq!(classify("-Ann"), Bucket::Single("Other"));
    assert_eq!(classify("4ever"), Bucket::Single("Other"));
}

fn records() -> Vec<FactRecord> {
    let build = |entries: &[(&str, FactValue)]| -> FactRecord {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    };
    vec![
        build(&[
            ("gender_flag", FactValue::Flags(1)),
            ("is_short_for", FactValue::set(["Anne"])),
        ]),
        build(&[
            ("gender_flag", FactValue::Flags(4)),
            ("lang", FactValue::Tag("en".into())),
        ]),
        build(&[
            ("is_short_for", FactValue::set(["Annabel", "Anne"])),
            ("lang", FactValue::set(["de"])),
        ]),
        FactRecord::new(),
    ]
}

#[test]
fn merge_is_idempotent_for_every_record() {
    for base in records() {
        for addition in records() {
            let mut once = base.clone();
            once.merge(&addition).unwrap();
            let mut twice = once.clone();
            twice.merge(&addition).unwrap();
            assert_eq!(once, twice);
        }
    }
}

#[test]
fn merge_order_does_not_change_the_result() {
    let all = records();
    let forward = all.iter().fold(FactRecord::new(), |mut acc, record| {
        acc.merge(record).unwrap();
        acc
    });
    let backward = all.iter().rev().fold(FactRecord::new(), |mut acc, record| {
        acc.merge(record).unwrap();
        acc
    });
    assert_eq!(forward, backward);
    assert_eq!(forward.get("gender_flag"), Some(&FactValue::Flags(5)));
    assert_eq!(forward.get("lang"), Some(&FactValue::set(["de", "en"])));
}

#[test]
fn variants_naming_the_page_itself_create_no_edge() {
    let mut store = MemoryNameStore::new();
    let id = store.insert_name("Anna", Some("")).unwrap();
    store.insert_name("Anne", None).unwrap();
    let entry = store.names_with_text(Some("Anna")).unwrap().remove(0);

    let mut facts = FactSet::new();
    facts.add("given-name.var", "Anna");
    facts.add("given-name.var", "Anne");
    let mut stats = RunStats::default();
    apply_facts(&mut store, &entry, &facts, Utc::now(), &mut stats).unwrap();

    let edges = store.relationships_from(id);
    assert_eq!(edges.len(), 1);
    assert!(edges.iter().all(|(_, target)| *target != id));
}

#[test]
fn category_titles_extract_language_gender_and_origin() {
    let table = LanguageTable::builtin();
    let mut stats = RunStats::default();
    let facts = parse_category(
        "Category:French male given names from Latin",
        &table,
        &mut stats,
    );
    assert!(facts.get("cat.lang").unwrap().contains("fr"));
    assert!(facts.get("cat.gender").unwrap().contains("male"));
    assert!(facts.get("cat.origin").unwrap().contains("la"));
    assert!(parse_category("Category:fr:SomePage", &table, &mut stats).is_empty());
}

#[test]
fn numbered_and_positional_arguments_share_a_field() {
    let table = LanguageTable::builtin();
    let mut stats = RunStats::default();
    let facts = parse_markup(
        "Sasha",
        "{{given name|ru|male|gender2=female}}",
        &table,
        &mut stats,
    );
    let genders = facts.get("given-name.gender").unwrap();
    assert_eq!(genders.len(), 2);
    assert!(genders.contains("male") && genders.contains("female"));
}
