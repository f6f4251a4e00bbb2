//! Section folding example
//!
//! Renders a small Lisp file with rules, folds every section, then edits a folded one.

use page_rule_core::{Document, MemorySurface, PageRuleConfig, SurfaceCapability};

fn main() {
    let text = ";;; demo.el\n\x0C\n;; Section A\n(defun a () 1)\n\x0C\n;; Section B\n(defun b () 2)\n";
    let surface = MemorySurface::new(SurfaceCapability::TextOnly, 24);
    let mut doc = Document::with_surface(text, PageRuleConfig::default(), surface);
    doc.set_language("emacs-lisp");

    if let Err(err) = doc.enable_mode() {
        eprintln!("cannot enable page rules: {err}");
        return;
    }

    println!("1. Rules:\n{}\n", doc.rendered());

    match doc.hide_all_sections() {
        Ok(count) => println!("2. Folded {count} sections:\n{}\n", doc.rendered()),
        Err(err) => eprintln!("folding failed: {err}"),
    }

    let offset = text.find("(defun b").map_or(0, |b| text[..b].chars().count());
    if let Err(err) = doc.insert(offset, ";; edited\n") {
        eprintln!("edit failed: {err}");
    }
    println!(
        "3. After editing section B ({} still folded):\n{}",
        doc.mode().fold_ranges().len(),
        doc.rendered()
    );
}
