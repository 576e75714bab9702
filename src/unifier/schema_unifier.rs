use crate::{RunLog, UnifyError, UnifyResult, parser::ParsedQuery, unifier::{PaddedItem, PaddedProjection, UnifiedSchema}};

/// The union schema and one padded projection per query, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unification {
    pub schema: UnifiedSchema,
    pub projections: Vec<PaddedProjection>,
}

impl Unification {
    /// Every projection walks the schema: same length, same names, same order.
    pub fn is_compatible(&self) -> bool {
        let names = self.schema.names();
        self.projections.iter().all(|projection| projection.names() == names)
    }
}

pub struct SchemaUnifier;

impl SchemaUnifier {
    pub fn unify(queries: &[ParsedQuery], log: &mut RunLog) -> UnifyResult<Unification> {
        if queries.is_empty() {
            return Err(UnifyError::validation("nothing to unify"));
        }

        for query in queries {
            log.info(format!(
                "{} projects {} column(s): {}",
                query.source_label,
                query.columns.len(),
                query.column_names().join(", ")
            ));
        }

        let schema = UnifiedSchema::from_queries(queries);
        let projections = queries.iter().map(|query| Self::pad(query, &schema, log)).collect();
        let unification = Unification { schema, projections };

        if !unification.is_compatible() {
            return Err(UnifyError::validation("padded projections disagree on the unified column order"));
        }

        log.info(format!(
            "Unified schema ({} columns): {}",
            unification.schema.len(),
            unification.schema.names().join(", ")
        ));

        Ok(unification)
    }

    fn pad(query: &ParsedQuery, schema: &UnifiedSchema, log: &mut RunLog) -> PaddedProjection {
        let mut items = Vec::with_capacity(schema.len());

        for (key, canonical) in schema.keys().zip(schema.names()) {
            match query.column(key) {
                Some(column) => {
                    if column.output_name != canonical {
                        log.info(format!(
                            "{}: `{}` is exposed as `{}`",
                            query.source_label, column.output_name, canonical
                        ));
                    }
                    items.push(PaddedItem::Native {
                        source_name: column.output_name.clone(),
                        canonical: canonical.to_string(),
                    });
                },
                None => items.push(PaddedItem::Null { canonical: canonical.to_string() }),
            }
        }

        let projection = PaddedProjection { source_label: query.source_label.clone(), items };

        let nulls = projection.null_columns();
        if nulls.is_empty() {
            log.info(format!("{}: no padding needed", query.source_label));
        } else {
            log.info(format!("{}: padded with NULL for {}", query.source_label, nulls.join(", ")));
        }

        projection
    }
}
