use colored::Colorize;
use prettytable::{row, Table};
use stack_templator::StackTemplate;

pub fn handle_list() {
    let mut table = Table::new();
    table.add_row(row![
        "Template".green().bold(),
        "Description".blue().bold()
    ]);
    for template in StackTemplate::ALL {
        table.add_row(row![template.name(), template.description()]);
    }
    table.printstd();
}
