use a11y_core::export::gate::Capabilities;
use a11y_core::scan::gateway::AnalyzerGateway;
use a11y_core::scan::reference::ReferenceAnalyzer;
use a11y_core::session::SessionRegistry;
use std::sync::Arc;

fn registry() -> SessionRegistry {
    SessionRegistry::new(AnalyzerGateway::new(Arc::new(ReferenceAnalyzer::new())))
}

#[tokio::test]
async fn sessions_keep_separate_histories() {
    let reg = registry();
    let alice = reg.session("alice", Capabilities::default());
    let bob = reg.session("bob", Capabilities { pdf_export: true });

    alice.submit_check("https://a.test").await.unwrap();
    alice.submit_check("https://b.test").await.unwrap();
    bob.submit_check("https://c.test").await.unwrap();

    assert_eq!(alice.list_checks().len(), 2);
    assert_eq!(bob.list_checks().len(), 1);
    assert_eq!(bob.list_checks()[0].url, "https://c.test");
    assert!(!alice.capabilities().pdf_export);
    assert!(bob.capabilities().pdf_export);
}

#[tokio::test]
async fn same_key_returns_same_session() {
    let reg = registry();
    let first = reg.session("k", Capabilities::default());
    first.submit_check("https://a.test").await.unwrap();

    let again = reg.session("k", Capabilities { pdf_export: true });
    assert!(Arc::ptr_eq(&first, &again));
    assert!(!again.capabilities().pdf_export);
    assert_eq!(again.list_checks().len(), 1);
    assert_eq!(reg.len(), 1);

    assert!(reg.end_session("k"));
    assert!(!reg.end_session("k"));
    assert!(reg.is_empty());
    assert!(reg.session("k", Capabilities::default()).list_checks().is_empty());
}
