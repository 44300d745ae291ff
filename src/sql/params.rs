//! Named placeholders (`:name`) compiled to PostgreSQL positional parameters (`$n`).

use crate::error::AppError;
use crate::sql::QueryBuf;
use regex::Regex;

/// `::` is matched first so casts such as `id::text` are left alone.
const PLACEHOLDER_PATTERN: &str = r"(?P<cast>::)|:(?P<name>[A-Za-z_][A-Za-z0-9_]*)";

pub struct NamedQuery;

impl NamedQuery {
    /// Rewrite `:name` placeholders in `sql` to `$1..$n` in order of first appearance and
    /// order `args` to match. A repeated name reuses its position. Every placeholder must
    /// have a value and every value must be used.
    pub fn compile(sql: &str, args: &[(&str, String)]) -> Result<QueryBuf, AppError> {
        let re = Regex::new(PLACEHOLDER_PATTERN)
            .map_err(|e| AppError::Query(format!("placeholder pattern: {}", e)))?;

        let mut out = String::with_capacity(sql.len());
        let mut order: Vec<&str> = Vec::new();
        let mut last = 0;
        for caps in re.captures_iter(sql) {
            let Some(name) = caps.name("name") else {
                continue;
            };
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let position = match order.iter().position(|n| *n == name.as_str()) {
                Some(i) => i + 1,
                None => {
                    order.push(name.as_str());
                    order.len()
                }
            };
            out.push_str(&sql[last..whole.start()]);
            out.push('$');
            out.push_str(&position.to_string());
            last = whole.end();
        }
        out.push_str(&sql[last..]);

        for (name, _) in args {
            if !order.contains(name) {
                return Err(AppError::Query(format!("parameter :{} is not used in query", name)));
            }
        }

        let mut q = QueryBuf::new();
        q.sql = out;
        for name in order {
            let value = args
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| AppError::Query(format!("no value bound for :{}", name)))?;
            q.push_param(value);
        }
        Ok(q)
    }
}
