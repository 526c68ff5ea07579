//! Terminal output helpers for the CLI.

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use crate::lookup::{NewsItem, PhotoResult};
use crate::types::Expert;

#[derive(Tabled)]
struct ExpertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Institution")]
    institution: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Expertise")]
    expertise: String,
}

impl From<&Expert> for ExpertRow {
    fn from(expert: &Expert) -> Self {
        Self {
            id: expert.id.clone(),
            name: expert.full_name().to_string(),
            institution: expert.institution_name().to_string(),
            role: expert.role_title().to_string(),
            expertise: expert.primary_expertise().join(", "),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Ui {
    colors: bool,
}

impl Ui {
    pub fn new(colors: bool) -> Self {
        if !colors {
            colored::control::set_override(false);
        }
        Self { colors }
    }

    pub fn colors_enabled(&self) -> bool {
        self.colors
    }

    pub fn print_header(&self, title: &str) {
        println!("{}", title.bold().cyan());
        println!("{}", "─".repeat(title.chars().count()).dimmed());
    }

    pub fn print_info(&self, message: &str) {
        println!("{}", message);
    }

    pub fn print_success(&self, message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    pub fn print_warning(&self, message: &str) {
        eprintln!("{} {}", "!".yellow(), message.yellow());
    }

    pub fn print_error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message.red());
    }

    pub fn expert_table(&self, experts: &[Expert]) -> String {
        let rows: Vec<ExpertRow> = experts.iter().map(ExpertRow::from).collect();
        Table::new(rows).with(Style::rounded()).to_string()
    }

    pub fn expert_details(&self, expert: &Expert) -> String {
        let mut lines = vec![
            format!("{}", expert.full_name().bold()),
            format!("  {:<14}{}", "ID:", expert.id),
            format!("  {:<14}{}", "Institution:", expert.institution_name()),
        ];
        if let Some(position) = &expert.institution.position {
            lines.push(format!("  {:<14}{}", "Position:", position));
        }
        if !expert.role_title().is_empty() {
            lines.push(format!("  {:<14}{}", "Role:", expert.role_title()));
        }
        if !expert.primary_expertise().is_empty() {
            lines.push(format!("  {:<14}{}", "Expertise:", expert.primary_expertise().join(", ")));
        }
        let keywords = expert.keywords();
        if !keywords.is_empty() {
            lines.push(format!("  {:<14}{}", "Keywords:", keywords.join(", ")));
        }
        if let Some(count) = expert.publication_count() {
            lines.push(format!("  {:<14}{}", "Publications:", count));
        }
        if let Some(email) = &expert.personal_info.email {
            lines.push(format!("  {:<14}{}", "Email:", email));
        }
        if let Some(linkedin) = expert.linkedin_url() {
            lines.push(format!("  {:<14}{}", "LinkedIn:", linkedin));
        }
        lines.push(format!("  {:<14}{}", "Image:", expert.image_or_default()));
        lines.join("\n")
    }

    pub fn news_list(&self, items: &[NewsItem]) -> String {
        if items.is_empty() {
            return format!("{}", "No news found".dimmed());
        }
        items
            .iter()
            .map(|item| {
                let mut entry = format!("• {}", item.title.bold());
                if let Some(date) = &item.date {
                    entry.push_str(&format!(" ({})", date));
                }
                entry.push_str(&format!("\n  {}", item.link.blue()));
                if let Some(snippet) = &item.snippet {
                    entry.push_str(&format!("\n  {}", snippet.dimmed()));
                }
                entry
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn photo_line(&self, photo: &PhotoResult) -> String {
        if photo.is_found() {
            format!("Photo: {}", photo.image_url.blue())
        } else {
            format!("{} ({})", "No photo found".dimmed(), photo.image_url)
        }
    }
}
