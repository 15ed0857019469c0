//! Plain-text rendering for the dashboard and the landing screen.

use comfy_table::{ContentArrangement, Table};
use todos_core::todos::TodoItem;

pub fn landing(register_url: Option<&str>) {
    println!("Welcome to your TODOs");
    println!("Please login or register to continue");
    println!();
    println!("  todos login      Sign in with email and password");
    match register_url {
        Some(url) => println!("  todos register   Create an account at {url}"),
        None => println!("  todos register   Create an account"),
    }
}

pub fn header(email: &str) {
    println!("Welcome back: {email}");
}

pub fn items(items: &[TodoItem]) {
    if items.is_empty() {
        println!("No todos yet. Add one with `todos add <title>`.");
        return;
    }
    println!("{}", table(items));
}

pub fn item(item: &TodoItem) {
    println!("{}", table(std::slice::from_ref(item)));
    if let Some(created) = item.created_at.as_deref() {
        println!("created  {created}");
    }
    if let Some(updated) = item.updated_at.as_deref() {
        println!("updated  {updated}");
    }
}

fn table(items: &[TodoItem]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(["Sort key", "Title", "Details", "Date", "Done"]);
    for item in items {
        table.add_row([
            item.sort_key.as_str(),
            item.todo_title.as_str(),
            item.todo_details.as_str(),
            item.todo_date.as_str(),
            if item.is_done { "yes" } else { "" },
        ]);
    }
    table
}
