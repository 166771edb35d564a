#![allow(dead_code)]
//! Shared helpers for the test suites: tracing setup and field builders.

use std::sync::Once;

use docmeta::fields::{Field, FieldKind, Term};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber once for the whole test binary.
pub fn setup_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt::init();
    });
}

pub fn term(guid: &str, label: &str) -> Term {
    Term {
        term_guid: guid.to_string(),
        label: label.to_string(),
    }
}

pub fn field(internal_name: &str, kind: FieldKind) -> Field {
    Field::new(
        format!("{internal_name}-id"),
        internal_name,
        internal_name,
        "",
        false,
        kind,
    )
}

pub fn choice_field(value: Option<&str>, choices: &[&str]) -> Field {
    field(
        "Status",
        FieldKind::Choice {
            value: value.map(str::to_string),
            choices: choices.iter().map(|c| c.to_string()).collect(),
        },
    )
}

pub fn taxonomy_field(terms: Vec<Term>) -> Field {
    field(
        "Department",
        FieldKind::Taxonomy {
            value: None,
            term_set_id: "ts-1".to_string(),
            terms,
        },
    )
}
