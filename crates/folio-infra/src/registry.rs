//! The annual school report, wired to the SQLite store.

use folio_core::section::registry::SectionRegistry;
use folio_types::section::SectionKind;

use crate::sqlite::pool::DatabasePool;
use crate::sqlite::section::SqliteSectionAdapter;

const SECTIONS: [(&str, SectionKind); 5] = [
    ("Basic information", SectionKind::BasicInfo),
    ("Enrollment", SectionKind::Enrollment),
    ("Attendance", SectionKind::Attendance),
    ("Finance", SectionKind::Finance),
    ("Declaration", SectionKind::Declaration),
];

pub fn school_registry(pool: &DatabasePool) -> SectionRegistry {
    SECTIONS
        .into_iter()
        .enumerate()
        .fold(SectionRegistry::builder(), |builder, (index, (title, kind))| {
            builder.section(title, kind, SqliteSectionAdapter::new(pool.clone(), index))
        })
        .build()
}
