use tabled::{
    settings::{themes::Colorization, Alignment, Color, Padding, Style},
    Table, Tabled,
};

/// Render rows as a table for a terminal, or as tab-delimited text when piped
pub fn render_table<T: Tabled>(rows: &[T], terminal_output: bool) -> String {
    let mut table = Table::new(rows);

    if terminal_output {
        table
            .with(Style::rounded())
            .with(Colorization::rows([Color::FG_WHITE, Color::BG_BLACK]))
    } else {
        table
            .with(Style::empty().vertical('\t'))
            .with(Alignment::left())
            .with(Padding::zero())
    }
    .to_string()
}
