use ordered_aggregation::{
    AggregationConfig, GraphSession, IndexFieldNames, ListSource, ListSourceIndexer, Predicate,
    Subject, Term, Vocabulary,
};
use serde_json::json;

const ROOT: &str = "http://example.org/book/1/list_source";
const TITLE: &str = "http://purl.org/dc/terms/title";

#[tokio::test]
async fn index_document_carries_order_and_container() {
    let (session, _store) = GraphSession::in_memory(AggregationConfig::default());
    let mut root = ListSource::new(&session, Subject::new(ROOT));
    root.set_attribute(Predicate::new(TITLE), vec![Term::literal("Pages")])
        .expect("title");
    root.append_target(Subject::new("http://example.org/page/2"))
        .expect("append");
    root.append_target(Subject::new("http://example.org/page/1"))
        .expect("append");
    root.save(&session).await.expect("save");

    let mut loaded = ListSource::load(&session, &Subject::new(ROOT))
        .await
        .expect("load");
    let document = ListSourceIndexer::new(session.config())
        .build(&mut loaded)
        .expect("index document");

    assert_eq!(document.id, ROOT);
    assert_eq!(
        document.get("ordered_targets_ssim"),
        Some(&json!(["http://example.org/page/2", "http://example.org/page/1"]))
    );
    assert_eq!(document.get("proxy_in_ssi"), Some(&json!(ROOT)));
    assert_eq!(document.get("has_model_ssim"), Some(&json!(["ListSource"])));
    assert_eq!(document.get(TITLE), Some(&json!(["Pages"])));
    assert_eq!(document.fields.len(), 4);
}

#[tokio::test]
async fn index_document_omits_bookkeeping_and_dates() {
    let vocab = Vocabulary::default();
    let (session, _store) = GraphSession::in_memory(AggregationConfig::default());
    let mut root = ListSource::new(&session, Subject::new(ROOT));
    root.append_target(Subject::new("x")).expect("append");
    root.save(&session).await.expect("save");

    let document = ListSourceIndexer::new(session.config())
        .build(&mut root)
        .expect("index document");

    for predicate in [&vocab.first, &vocab.last, &vocab.has_part] {
        assert!(!document.contains(predicate.as_str()));
    }
    assert!(!document.contains("system_create_dtsi"));
    assert!(!document.contains("system_modified_dtsi"));
    assert_eq!(document.get("ordered_targets_ssim"), Some(&json!(["x"])));
}

#[tokio::test]
async fn index_field_names_follow_configuration() {
    let config = AggregationConfig::new()
        .index_fields(IndexFieldNames {
            ordered_targets: "members".to_string(),
            proxy_in: "container".to_string(),
            has_model: "model".to_string(),
        })
        .model_name("Sequence");
    let (session, _store) = GraphSession::in_memory(config);
    let mut root = ListSource::new(&session, Subject::new(ROOT));

    let document = ListSourceIndexer::new(session.config())
        .build(&mut root)
        .expect("index document");

    assert_eq!(document.get("members"), Some(&json!([])));
    assert_eq!(document.get("container"), Some(&json!(ROOT)));
    assert_eq!(document.get("model"), Some(&json!(["Sequence"])));

    let json = document.to_json().expect("serialize");
    assert!(json.contains("\"members\":[]"));
}
