use page_rule_core::{CursorMotion, HostError, PageRuleConfig, PageRuleError, Workspace};
use pretty_assertions::assert_eq;

const LISP: &str = ";;; notes\n\x0C\n;; Part one\nalpha\n\x0C\n;; Part two\nbeta";

fn config() -> PageRuleConfig {
    PageRuleConfig {
        enabled_languages: vec!["emacs-lisp".to_string()],
        ..PageRuleConfig::default()
    }
}

#[test]
fn test_mode_is_enabled_for_configured_languages() {
    let mut ws = Workspace::new(config());
    let lisp = ws.open_buffer(LISP, Some("emacs-lisp"));
    let plain = ws.open_buffer(LISP, Some("text"));
    let unnamed = ws.open_buffer(LISP, None);

    assert!(ws.document(lisp).unwrap().mode().is_enabled());
    assert!(!ws.document(plain).unwrap().mode().is_enabled());
    assert!(!ws.document(unnamed).unwrap().mode().is_enabled());
    assert_eq!(ws.buffer_ids(), vec![lisp, plain, unnamed]);
}

#[test]
fn test_buffers_fold_independently() {
    let mut ws = Workspace::new(config());
    let a = ws.open_buffer(LISP, Some("emacs-lisp"));
    let b = ws.open_buffer(LISP, Some("emacs-lisp"));

    assert_eq!(ws.hide_all_sections(a).unwrap(), 2);
    assert!(ws.document(b).unwrap().mode().fold_ranges().is_empty());

    ws.disable_mode(b).unwrap();
    assert_eq!(ws.document(a).unwrap().mode().fold_ranges().len(), 2);
    assert_eq!(ws.document(a).unwrap().surface().override_count(), 2);

    ws.show_all_sections(a).unwrap();
    assert!(ws.document(a).unwrap().mode().fold_ranges().is_empty());
}

#[test]
fn test_host_failure_only_disables_that_buffer() {
    let mut ws = Workspace::new(config());
    let a = ws.open_buffer(LISP, Some("emacs-lisp"));
    let b = ws.open_buffer(LISP, Some("emacs-lisp"));

    ws.document_mut(a)
        .unwrap()
        .surface_mut()
        .set_invisibility_supported(false);

    let err = ws.toggle_section_at(a, 20).unwrap_err();
    assert!(matches!(err, PageRuleError::Host(_)));
    assert!(!ws.document(a).unwrap().mode().is_enabled());
    assert_eq!(ws.document(a).unwrap().surface().override_count(), 0);

    assert!(ws.document(b).unwrap().mode().is_enabled());
    assert!(ws.toggle_section_at(b, 20).is_ok());
}

#[test]
fn test_override_failure_during_edit_disables_mode() {
    let mut ws = Workspace::new(config());
    let id = ws.open_buffer(LISP, Some("emacs-lisp"));
    assert_eq!(ws.hide_all_sections(id).unwrap(), 2);

    let doc = ws.document_mut(id).unwrap();
    doc.surface_mut().set_override_limit(Some(2));

    let err = doc.insert(0, "\x0C\n").unwrap_err();
    assert!(matches!(
        err,
        PageRuleError::Host(HostError::OverrideUnavailable(_))
    ));

    // The text change stays applied; every display side effect is gone.
    assert_eq!(doc.text(), format!("\x0C\n{LISP}"));
    assert!(!doc.mode().is_enabled());
    assert!(doc.mode().fold_ranges().is_empty());
    assert_eq!(doc.surface().override_count(), 0);
    assert_eq!(doc.surface().invisible_count(), 0);

    // Later edits are ignored until the mode is enabled again.
    assert!(doc.insert(0, "x").is_ok());
    assert_eq!(doc.surface().override_count(), 0);
}

#[test]
fn test_invalid_delimiter_keeps_buffer_open() {
    let mut ws = Workspace::new(PageRuleConfig {
        delimiter: "(".to_string(),
        ..config()
    });
    let id = ws.open_buffer(LISP, Some("emacs-lisp"));

    assert!(!ws.document(id).unwrap().mode().is_enabled());
    assert!(matches!(
        ws.enable_mode(id),
        Err(PageRuleError::InvalidPattern { .. })
    ));
}

#[test]
fn test_unknown_buffer() {
    let mut ws = Workspace::new(config());
    let id = ws.open_buffer("", None);
    ws.close_buffer(id).unwrap();

    assert_eq!(ws.enable_mode(id), Err(PageRuleError::UnknownBuffer(id)));
    assert_eq!(ws.show_all_sections(id), Err(PageRuleError::UnknownBuffer(id)));
}

#[test]
fn test_cursor_avoidance_in_documents() {
    let mut ws = Workspace::new(PageRuleConfig {
        avoid_cursor: true,
        ..config()
    });
    let id = ws.open_buffer(LISP, Some("emacs-lisp"));
    let doc = ws.document_mut(id).unwrap();

    // The first form feed is at offset 10.
    assert_eq!(doc.move_cursor(9, CursorMotion::Interactive), 9);
    assert_eq!(doc.move_cursor(10, CursorMotion::Interactive), 11);
    assert_eq!(doc.move_cursor(10, CursorMotion::Interactive), 9);
    assert_eq!(doc.move_cursor(10, CursorMotion::Programmatic), 10);

    doc.disable_mode();
    assert_eq!(doc.move_cursor(10, CursorMotion::Interactive), 10);
}
