use super::tables::ALL_TABLES;
use super::types::TableSchema;
use std::collections::{HashMap, HashSet};

/// Orders tables by their foreign key dependencies
pub struct DependencyResolver {
    tables: &'static [&'static TableSchema],
    /// Map of table name -> tables it depends on
    deps: HashMap<&'static str, HashSet<&'static str>>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        Self::for_tables(ALL_TABLES)
    }

    /// Resolver over an explicit table set, in declaration order
    pub fn for_tables(tables: &'static [&'static TableSchema]) -> Self {
        let deps = tables
            .iter()
            .map(|table| (table.name, table.dependencies()))
            .collect();

        Self { tables, deps }
    }

    /// Tables in creation order (parents before children).
    /// Ties keep the declaration order of `ALL_TABLES`.
    pub fn creation_order(&self) -> Result<Vec<&'static TableSchema>, String> {
        let mut levelled = self.levelled()?;
        levelled.sort_by_key(|(level, _)| *level);
        Ok(levelled.into_iter().map(|(_, table)| table).collect())
    }

    /// Tables in drop order (children before parents)
    pub fn drop_order(&self) -> Result<Vec<&'static TableSchema>, String> {
        let mut levelled = self.levelled()?;
        levelled.sort_by_key(|(level, _)| std::cmp::Reverse(*level));
        Ok(levelled.into_iter().map(|(_, table)| table).collect())
    }

    fn levelled(&self) -> Result<Vec<(usize, &'static TableSchema)>, String> {
        let mut memo = HashMap::new();
        self.tables
            .iter()
            .map(|table| {
                let level = self.level(table.name, &mut memo, &mut HashSet::new())?;
                Ok((level, *table))
            })
            .collect()
    }

    /// Length of the longest FK chain from `name` to a table with no parents
    fn level<'a>(
        &self,
        name: &'a str,
        memo: &mut HashMap<&'a str, usize>,
        visiting: &mut HashSet<&'a str>,
    ) -> Result<usize, String> {
        if let Some(level) = memo.get(name) {
            return Ok(*level);
        }
        if !self.deps.contains_key(name) {
            return Err(format!("Unknown table: {}", name));
        }
        if !visiting.insert(name) {
            return Err(format!("Circular dependency detected at: {}", name));
        }

        let mut level = 0;
        if let Some(deps) = self.deps.get(name) {
            for dep in deps {
                if *dep != name {
                    level = level.max(self.level(*dep, memo, visiting)? + 1);
                }
            }
        }

        visiting.remove(name);
        memo.insert(name, level);
        Ok(level)
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}
