// Entry point and high-level console flow.
//
// - Option [1] loads the result export and normalizes it.
// - Option [2] asks for a date range, then for one of the manufacturers with
//   records in it, prints the summary cards, the three heatmaps and the top-N
//   table, and writes them to disk.
//
// End of input on any prompt exits the program.
// - Option [3] switches the presentation theme.
use once_cell::sync::Lazy;
use purchase_sales_report::config::{DashboardConfig, Theme, CONFIG_ENV, DEFAULT_CONFIG_PATH};
use purchase_sales_report::dashboard::{build_dashboard, ranking_rows, summary_stats};
use purchase_sales_report::error::AppError;
use purchase_sales_report::filter::{manufacturer_options, DateRange, Filters, ManufacturerFilter};
use purchase_sales_report::types::Record;
use purchase_sales_report::{loader, normalizer, output, util};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// Records are loaded once and reused across report runs.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        data: None,
        theme: Theme::default(),
    })
});

struct AppState {
    data: Option<Vec<Record>>,
    theme: Theme,
}

/// One trimmed line, or `None` once the input is closed or unreadable.
fn read_trimmed_line<R: BufRead>(reader: &mut R) -> Option<String> {
    let mut buf = String::new();
    match reader.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    read_trimmed_line(&mut io::stdin().lock())
}

fn read_choice() -> Option<String> {
    prompt("Enter choice: ")
}

/// Ask the user whether to go back to the menu after generating reports.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(answer) = prompt("Back to Report Selection (Y/N): ") else {
            return false;
        };
        match answer.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn load_config() -> Result<DashboardConfig, AppError> {
    let path = std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    Ok(DashboardConfig::load_or_default(&path)?)
}

/// Handle option [1]: load and normalize the result export.
fn handle_load(config: &DashboardConfig) -> Result<(), AppError> {
    let table = loader::load_raw_table(&config.data_path)?;
    let (data, report) = normalizer::normalize(&table, &config.columns, config.difference)?;
    println!(
        "Processing dataset... ({} rows loaded, {} manufacturer/month records)",
        util::format_int(report.total_rows),
        util::format_int(data.len())
    );
    if report.collapsed_rows > 0 {
        println!(
            "Info: {} rows merged into existing (manufacturer, year, month) records.",
            util::format_int(report.collapsed_rows)
        );
    }
    for warning in &report.warnings {
        println!("Warning: {}", warning);
    }
    println!();
    let mut state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
    state.data = Some(data);
    Ok(())
}

fn select_manufacturer(options: &[String]) -> ManufacturerFilter {
    println!("Select manufacturer:");
    println!("[0] Todos");
    for (i, m) in options.iter().enumerate() {
        println!("[{}] {}", i + 1, m);
    }
    let choice = read_choice().unwrap_or_default();
    match choice.parse::<usize>() {
        Ok(i) if i >= 1 && i <= options.len() => ManufacturerFilter::Only(options[i - 1].clone()),
        _ => ManufacturerFilter::All,
    }
}

fn select_date_range(config: &DashboardConfig) -> Result<DateRange, AppError> {
    let default = config.date_range()?;
    let start = prompt(&format!("Start date [{}]: ", default.start()));
    let end = prompt(&format!("End date [{}]: ", default.end()));
    let start = util::parse_date_safe(start.as_deref()).unwrap_or(default.start());
    let end = util::parse_date_safe(end.as_deref()).unwrap_or(default.end());
    Ok(DateRange::new(start, end)?)
}

/// Handle option [2]: build the dashboard for the chosen filters, print
/// previews and write CSV/JSON exports.
fn handle_generate_reports(config: &DashboardConfig) -> Result<(), AppError> {
    let (data, theme) = {
        let state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
        (state.data.clone(), state.theme)
    };
    let Some(data) = data else {
        println!("Error: No data loaded. Please load the file first (option 1).\n");
        return Ok(());
    };

    let period = Filters {
        date_range: Some(select_date_range(config)?),
        ..Filters::default()
    };
    let options = manufacturer_options(&period.apply(&data, config.grouping), config.grouping);
    let filters = Filters {
        manufacturer: select_manufacturer(&options),
        ..period
    };
    let dashboard = build_dashboard(&data, &filters, config)?;
    if dashboard.is_empty() {
        println!("No data found for the selected period.\n");
        return Ok(());
    }

    println!("\nAnálise de Compras e Vendas (theme: {})\n", theme.plot_template());
    output::preview_table_rows(&dashboard.cards, 3);

    let out_dir = Path::new(&config.output_dir);
    for heatmap in &dashboard.heatmaps {
        let file = out_dir.join(format!("heatmap_{}.csv", heatmap.metric));
        output::write_pivot_csv(&file, &heatmap.grid)?;
        println!("{} ({}, scale {})\n", heatmap.title, heatmap.tab, heatmap.color_scale);
        output::preview_pivot(&heatmap.grid, 10)?;
        println!("(Full table exported to {})\n", file.display());
    }

    if let Some(top) = &dashboard.top {
        let rows = ranking_rows(top)?;
        let file = out_dir.join("top_manufacturers.csv");
        output::write_csv(&file, &rows)?;
        println!("Top {} Fabricantes\n", config.top_n);
        output::preview_table_rows(&rows, config.top_n);
        println!("(Full table exported to {})\n", file.display());
    }

    let selected = filters.apply(&data, config.grouping);
    let summary = summary_stats(&selected, config.grouping);
    let file = out_dir.join("summary.json");
    output::write_json(&file, &summary)?;
    tracing::info!("wrote reports to {}", out_dir.display());
    Ok(())
}

fn handle_toggle_theme() {
    let mut state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
    println!("{}\n", state.theme.button_label());
    state.theme = state.theme.toggled();
}

fn main() {
    tracing_subscriber::fmt::init();

    let config = match load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };
    {
        let mut state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
        state.theme = config.theme;
    }

    loop {
        println!("Select option:");
        println!("[1] Load the file");
        println!("[2] Generate Reports");
        println!("[3] Toggle theme\n");
        let Some(choice) = read_choice() else {
            println!("\nExiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => {
                if let Err(e) = handle_load(&config) {
                    eprintln!("Failed to load file: {}\n", e);
                }
            }
            "2" => {
                println!();
                if let Err(e) = handle_generate_reports(&config) {
                    eprintln!("Report error: {}\n", e);
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => handle_toggle_theme(),
            _ => {
                println!("Invalid choice. Please enter 1, 2 or 3.\n");
            }
        }
    }
}
