//! AND / OR / NOT

use tracing::trace;

use super::{FilterTranslator, Scope};
use crate::ast::Filter;
use crate::error::{FilterParserError, FilterResult};
use crate::query::{LogicalOperator, Query, SpatialFilter};

/// True when `text` is one Lucene clause: no whitespace outside brackets,
/// quotes or escapes
fn is_single_clause(text: &str) -> bool {
    let mut depth = 0usize;
    let mut quoted = false;
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '"' => quoted = !quoted,
            _ if quoted => {}
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => return false,
            _ => {}
        }
    }
    true
}

/// Parenthesise a text child that holds more than one clause
pub(super) fn clause(text: String) -> String {
    if is_single_clause(&text) {
        text
    } else {
        format!("({})", text)
    }
}

impl FilterTranslator {
    /// Translate the operands of AND/OR and merge what can be merged
    ///
    /// Text children join into one parenthesised Lucene string and spatial
    /// children into one chain. When both kinds (or nested composites) are
    /// present, the result is a composite whose children are, in order: the
    /// spatial chain, the merged text, then the nested composites.
    pub(super) fn binary_logic(
        &self,
        scope: Scope,
        operator: LogicalOperator,
        operands: &[Filter],
    ) -> FilterResult<Query> {
        if operands.len() < 2 {
            return Err(FilterParserError::invalid_constraint(format!(
                "the {} operator needs at least two operands, found {}",
                operator,
                operands.len()
            )));
        }

        let mut texts = Vec::new();
        let mut spatials = Vec::new();
        let mut composites = Vec::new();
        for operand in operands {
            match self.visit(scope, operand)? {
                Query::Text(text) => texts.push(text),
                Query::Spatial(filter) => spatials.push(filter),
                composite => composites.push(composite),
            }
        }
        trace!(
            %operator,
            texts = texts.len(),
            spatials = spatials.len(),
            composites = composites.len(),
            "merging logical operands"
        );

        let merged_text = match texts.len() {
            0 => None,
            1 => texts.pop(),
            _ => {
                let clauses: Vec<String> = texts.into_iter().map(clause).collect();
                Some(format!("({})", clauses.join(&format!(" {} ", operator))))
            }
        };

        if spatials.is_empty() && composites.is_empty() {
            if let Some(text) = merged_text {
                return Ok(Query::Text(text));
            }
        }
        if merged_text.is_none() && composites.is_empty() {
            return Ok(Query::Spatial(SpatialFilter::chain(operator, spatials)));
        }

        let mut children = Vec::with_capacity(2 + composites.len());
        if !spatials.is_empty() {
            children.push(Query::Spatial(SpatialFilter::chain(operator, spatials)));
        }
        if let Some(text) = merged_text {
            children.push(Query::Text(text));
        }
        children.extend(composites);
        Ok(Query::Composite { operator, children })
    }

    /// NOT keeps its operand whole under a composite
    pub(super) fn negation(&self, scope: Scope, operand: &Filter) -> FilterResult<Query> {
        let inner = self.visit(scope, operand)?;
        Ok(Query::Composite {
            operator: LogicalOperator::Not,
            children: vec![inner],
        })
    }
}
