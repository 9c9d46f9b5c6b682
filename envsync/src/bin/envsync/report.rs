//! Table renderings of the comparison reports.
//!
//! Every report row carries one cell per environment, aligned with the
//! report's environment order; absence renders as an empty cell.

use comfy_table::{Attribute, Cell, Color as TableColor, Table};

use envsync::compare::{ApiKeyReport, EndpointReport, PermissionReport};
use envsync::diff::SchemaReport;

use crate::output::{GlobalOptions, TableDisplay};

fn themed_table(options: &GlobalOptions) -> Table {
    let mut table = Table::new();

    if !options.no_color {
        table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
    } else {
        table.load_preset(comfy_table::presets::ASCII_FULL);
    }

    table
}

fn header_cells(options: &GlobalOptions, headers: Vec<&str>) -> Vec<Cell> {
    headers
        .into_iter()
        .map(|header| {
            let cell = Cell::new(header).add_attribute(Attribute::Bold);
            if options.no_color {
                cell
            } else {
                cell.fg(TableColor::Cyan)
            }
        })
        .collect()
}

impl TableDisplay for SchemaReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options);

        let mut headers = vec!["Table", "Column"];
        headers.extend(self.environments.iter().map(String::as_str));
        table.set_header(header_cells(options, headers));

        for diff in &self.tables {
            for (index, column) in diff.columns.iter().enumerate() {
                // Name the table only on its first row.
                let table_cell = if index == 0 { diff.table.as_str() } else { "" };
                let mut row = vec![Cell::new(table_cell), Cell::new(&column.column)];
                row.extend(column.signatures.iter().map(Cell::new));
                table.add_row(row);
            }
        }

        table
    }

    fn to_compact(&self) -> String {
        let columns: usize = self.tables.iter().map(|diff| diff.columns.len()).sum();
        format!(
            "{columns} differing column(s) across {} table(s)",
            self.tables.len()
        )
    }
}

impl TableDisplay for ApiKeyReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options);

        let mut headers = vec!["API Key"];
        headers.extend(self.environments.iter().map(String::as_str));
        table.set_header(header_cells(options, headers));

        for row in &self.keys {
            let mut cells = vec![Cell::new(&row.key)];
            cells.extend(
                row.present
                    .iter()
                    .map(|present| Cell::new(if *present { "yes" } else { "no" })),
            );
            table.add_row(cells);
        }

        table
    }

    fn to_compact(&self) -> String {
        format!("{} API key(s) missing from some environment", self.keys.len())
    }
}

impl TableDisplay for PermissionReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options);

        let mut headers = vec!["Role", "Operation"];
        headers.extend(self.environments.iter().map(String::as_str));
        table.set_header(header_cells(options, headers));

        for row in &self.rows {
            let mut cells = vec![Cell::new(&row.role), Cell::new(&row.operation)];
            cells.extend(row.access.iter().map(Cell::new));
            table.add_row(cells);
        }

        table
    }

    fn to_compact(&self) -> String {
        format!("{} role permission(s) differ", self.rows.len())
    }
}

impl TableDisplay for EndpointReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options);

        let mut headers = vec!["Service", "Endpoint"];
        headers.extend(self.environments.iter().map(String::as_str));
        table.set_header(header_cells(options, headers));

        for row in &self.rows {
            let mut cells = vec![Cell::new(&row.service), Cell::new(&row.endpoint)];
            cells.extend(row.signatures.iter().map(Cell::new));
            table.add_row(cells);
        }

        table
    }

    fn to_compact(&self) -> String {
        format!("{} endpoint(s) differ", self.rows.len())
    }
}
