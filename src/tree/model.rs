//! Table-style read-only adapter over a [`TraceTree`].
//!
//! Views address cells by `(row, column, parent)` the way item-model
//! toolkits do. The adapter also keeps a flat depth-first list of all
//! entries (the "proxy") for views that filter or sort the whole trace.

use super::entry::{EntryId, EntryRef, TraceTree};
use crate::parser::FileId;
use crate::utils::config::MODEL_COLUMN_COUNT;

/// Columns, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Context,
    Kind,
    Duration,
    Memory,
}

impl Column {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Context),
            1 => Some(Self::Kind),
            2 => Some(Self::Duration),
            3 => Some(Self::Memory),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Context => "Context",
            Self::Kind => "Kind",
            Self::Duration => "Duration",
            Self::Memory => "Memory",
        }
    }
}

/// What a view wants from a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRole {
    /// Human readable text
    Display,
    /// Raw value suitable for ordering
    Sort,
    /// Source file of the entry, for file filters
    SourceFile,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Float(f64),
    Integer(i64),
    File(FileId),
}

/// Address of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelIndex {
    pub row: usize,
    pub column: usize,
    pub entry: EntryId,
}

pub struct TraceListModel<'a> {
    tree: &'a TraceTree,
    proxy: Vec<EntryId>,
}

impl<'a> TraceListModel<'a> {
    pub fn new(tree: &'a TraceTree) -> Self {
        let mut model = Self {
            tree,
            proxy: Vec::new(),
        };
        model.refresh_proxy();
        model
    }

    pub fn column_count(&self) -> usize {
        MODEL_COLUMN_COUNT
    }

    pub fn header(&self, column: usize) -> Option<&'static str> {
        Column::from_index(column).map(Column::title)
    }

    /// Children under `parent`; `None` addresses the root
    pub fn row_count(&self, parent: Option<EntryId>) -> usize {
        self.resolve(parent).map_or(0, |entry| entry.child_count())
    }

    /// Index of the `row`-th child of `parent`
    pub fn index(&self, row: usize, column: usize, parent: Option<EntryId>) -> Option<ModelIndex> {
        if column >= self.column_count() {
            return None;
        }
        let child = self.resolve(parent)?.child(row)?;
        Some(ModelIndex {
            row,
            column,
            entry: child.id(),
        })
    }

    /// Index of the parent entry, `None` for children of the root
    pub fn parent(&self, index: &ModelIndex) -> Option<ModelIndex> {
        let parent = self.tree.get(index.entry)?.parent()?;
        parent.parent()?;
        Some(ModelIndex {
            row: parent.index_in_parent(),
            column: 0,
            entry: parent.id(),
        })
    }

    pub fn data(&self, index: &ModelIndex, role: DataRole) -> Option<CellValue> {
        let entry = self.tree.get(index.entry)?;
        let column = Column::from_index(index.column)?;

        match role {
            DataRole::Display => Some(CellValue::Text(display_text(&entry, column))),
            DataRole::Sort => Some(match column {
                Column::Context => CellValue::Text(entry.context.clone()),
                Column::Kind => CellValue::Text(entry.kind.to_string()),
                Column::Duration => CellValue::Float(entry.duration),
                Column::Memory => CellValue::Integer(entry.memory_usage),
            }),
            DataRole::SourceFile => entry.source_file_id.map(CellValue::File),
        }
    }

    pub fn entry(&self, index: &ModelIndex) -> Option<EntryRef<'a>> {
        self.tree.get(index.entry)
    }

    /// Rebuild the flat list of entries in depth-first order
    pub fn refresh_proxy(&mut self) {
        self.proxy = self.tree.depth_first_all().map(|entry| entry.id()).collect();
    }

    pub fn proxy_rows(&self) -> &[EntryId] {
        &self.proxy
    }

    fn resolve(&self, parent: Option<EntryId>) -> Option<EntryRef<'a>> {
        match parent {
            Some(id) => self.tree.get(id),
            None => Some(self.tree.root()),
        }
    }
}

fn display_text(entry: &EntryRef<'_>, column: Column) -> String {
    match column {
        Column::Context => entry.context.clone(),
        Column::Kind => entry.kind.to_string(),
        Column::Duration => format!("{:.3} ms", entry.duration * 1000.0),
        Column::Memory => format!("{} B", entry.memory_usage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TraceReader;

    const TRACE: &str = r#"<Trace>
<TemplateBegin><Context context="A"/><PointOfInstantiation>a.cpp|1|1</PointOfInstantiation><TimeStamp time="0"/></TemplateBegin>
<TemplateBegin><Context context="B"/><Kind>Memoization</Kind><PointOfInstantiation>b.h|2|3</PointOfInstantiation><TimeStamp time="0.25"/></TemplateBegin>
<TemplateEnd><TimeStamp time="0.5"/><MemoryUsage bytes="64"/></TemplateEnd>
<TemplateBegin><Context context="C"/></TemplateBegin>
<TemplateEnd/>
<TemplateEnd><TimeStamp time="1"/></TemplateEnd>
</Trace>"#;

    #[test]
    fn test_shape() {
        let parsed = TraceReader::new("/src").read(TRACE.as_bytes()).unwrap();
        let model = TraceListModel::new(&parsed.tree);

        assert_eq!(model.column_count(), 4);
        assert_eq!(model.header(2), Some("Duration"));
        assert_eq!(model.header(4), None);
        assert_eq!(model.row_count(None), 2);
        assert_eq!(model.row_count(Some(EntryId(1))), 0);
        assert!(model.index(2, 0, None).is_none());
        assert!(model.index(0, 4, None).is_none());
    }

    #[test]
    fn test_data_roles() {
        let parsed = TraceReader::new("/src").read(TRACE.as_bytes()).unwrap();
        let model = TraceListModel::new(&parsed.tree);
        let b = model.index(0, 1, None).unwrap();

        assert_eq!(b.entry, EntryId(1));
        assert_eq!(
            model.data(&b, DataRole::Display),
            Some(CellValue::Text("Memoization".to_string()))
        );

        let duration = ModelIndex { column: 2, ..b };
        assert_eq!(model.data(&duration, DataRole::Sort), Some(CellValue::Float(0.25)));
        assert_eq!(
            model.data(&duration, DataRole::Display),
            Some(CellValue::Text("250.000 ms".to_string()))
        );

        let memory = ModelIndex { column: 3, ..b };
        assert_eq!(model.data(&memory, DataRole::Sort), Some(CellValue::Integer(64)));

        let file = parsed.files.id_of("/src/b.h").unwrap();
        assert_eq!(model.data(&b, DataRole::SourceFile), Some(CellValue::File(file)));

        let c = model.index(1, 0, None).unwrap();
        assert_eq!(model.data(&c, DataRole::SourceFile), None);
        assert!(model.parent(&c).is_none());
    }

    #[test]
    fn test_proxy_is_depth_first() {
        let parsed = TraceReader::new("/src").read(TRACE.as_bytes()).unwrap();
        let model = TraceListModel::new(&parsed.tree);

        assert_eq!(model.proxy_rows(), &[EntryId(0), EntryId(1), EntryId(2)]);
    }

    #[test]
    fn test_proxy_includes_later_top_level_entries() {
        let xml = r#"<TemplateBegin><Context context="first"/></TemplateBegin>
<TemplateBegin><Context context="inner"/></TemplateBegin><TemplateEnd/>
<TemplateEnd/>
<TemplateBegin><Context context="second"/></TemplateBegin><TemplateEnd/>"#;
        let parsed = TraceReader::new("/src").read(xml.as_bytes()).unwrap();
        let model = TraceListModel::new(&parsed.tree);

        assert_eq!(model.proxy_rows().len(), parsed.tree.len());
        assert_eq!(model.proxy_rows(), &[EntryId(0), EntryId(1), EntryId(2)]);
    }
}
