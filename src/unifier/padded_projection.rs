use crate::parser::sql_ident;

/// One slot of a padded projection: either a column the query produces or a
/// `NULL` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaddedItem {
    Native { source_name: String, canonical: String },
    Null { canonical: String },
}

impl PaddedItem {
    pub fn canonical(&self) -> &str {
        match self {
            PaddedItem::Native { canonical, .. } | PaddedItem::Null { canonical } => canonical,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PaddedItem::Null { .. })
    }

    /// Item as selected from the query's CTE.
    pub fn render(&self) -> String {
        match self {
            PaddedItem::Native { source_name, canonical } if source_name == canonical => {
                sql_ident::render_identifier(source_name)
            },
            PaddedItem::Native { source_name, canonical } => format!(
                "{} AS {}",
                sql_ident::render_identifier(source_name),
                sql_ident::render_identifier(canonical)
            ),
            PaddedItem::Null { canonical } => format!("NULL AS {}", sql_ident::render_identifier(canonical)),
        }
    }
}

/// The unified column list as seen from one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedProjection {
    pub source_label: String,
    pub items: Vec<PaddedItem>,
}

impl PaddedProjection {
    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(PaddedItem::canonical).collect()
    }

    pub fn null_columns(&self) -> Vec<&str> {
        self.items.iter().filter(|item| item.is_null()).map(PaddedItem::canonical).collect()
    }

    pub fn render(&self) -> String {
        self.items.iter().map(PaddedItem::render).collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use crate::unifier::{PaddedItem, PaddedProjection};

    #[test]
    pub fn test_render_items() {
        let projection = PaddedProjection {
            source_label: "Query 2".to_string(),
            items: vec![
                PaddedItem::Native { source_name: "x".to_string(), canonical: "x".to_string() },
                PaddedItem::Null { canonical: "y".to_string() },
                PaddedItem::Native { source_name: "total".to_string(), canonical: "Total".to_string() },
                PaddedItem::Null { canonical: "count(*)".to_string() },
            ],
        };

        assert_eq!(projection.render(), "x, NULL AS y, total AS Total, NULL AS \"count(*)\"");
        assert_eq!(projection.names(), vec!["x", "y", "Total", "count(*)"]);
        assert_eq!(projection.null_columns(), vec!["y", "count(*)"]);
    }
}
