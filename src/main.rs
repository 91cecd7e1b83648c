// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use std::env;

use currency_registry::CurrencyRegistry;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("list") => run_list(),
        Some("show") => run_show(args.get(2).map(String::as_str)),
        Some("numeric") => run_numeric(args.get(2).map(String::as_str)),
        _ => run_ui_mode(),
    }
}

fn run_list() -> Result<()> {
    let registry = CurrencyRegistry::new();

    println!("💱 Currency Registry — {} currencies", registry.count());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{:<6} {:<28} {:<8} {:>7} {:>4}", "CODE", "NAME", "SYMBOL", "NUMERIC", "EXP");

    for currency in registry.all() {
        let numeric = currency
            .iso_numeric()
            .map(|n| format!("{:03}", n))
            .unwrap_or_else(|_| "-".to_string());
        println!(
            "{:<6} {:<28} {:<8} {:>7} {:>4}",
            currency.to_string(),
            currency.name().unwrap_or_default(),
            currency.symbol().unwrap_or_default(),
            numeric,
            currency.exponent(),
        );
    }

    Ok(())
}

fn run_show(code: Option<&str>) -> Result<()> {
    let Some(code) = code else {
        eprintln!("❌ Usage: currency-registry show <code>");
        std::process::exit(2);
    };

    let registry = CurrencyRegistry::new();
    let Some(currency) = registry.find(code) else {
        eprintln!("❌ Unknown currency: {}", code);
        std::process::exit(1);
    };

    println!("💱 {}", currency);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  name:                   {}", currency.name().unwrap_or_default());
    println!("  iso_code:               {}", currency.iso_code().unwrap_or_else(|_| "-".to_string()));
    println!(
        "  iso_numeric:            {}",
        currency
            .iso_numeric()
            .map(|n| format!("{:03}", n))
            .unwrap_or_else(|_| "-".to_string())
    );
    println!("  symbol:                 {}", currency.symbol().unwrap_or_default());
    println!("  subunit:                {}", currency.subunit().unwrap_or_default());
    println!("  subunit_to_unit:        {}", currency.subunit_to_unit());
    println!("  exponent:               {}", currency.exponent());
    println!("  symbol_first:           {}", currency.symbol_first());
    println!("  decimal_mark:           {}", currency.decimal_mark().unwrap_or_default());
    println!("  thousands_separator:    {}", currency.thousands_separator().unwrap_or_default());
    println!(
        "  smallest_denomination:  {}",
        currency
            .smallest_denomination()
            .map(|d| d.to_string())
            .unwrap_or_else(|_| "-".to_string())
    );

    Ok(())
}

fn run_numeric(num: Option<&str>) -> Result<()> {
    let Some(num) = num else {
        eprintln!("❌ Usage: currency-registry numeric <code>");
        std::process::exit(2);
    };

    let registry = CurrencyRegistry::new();
    match registry.find_by_iso_numeric(num) {
        Some(currency) => run_show(Some(currency.id())),
        None => {
            eprintln!("❌ No currency assigned to numeric code: {}", num);
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode() -> Result<()> {
    println!("🖥️  Loading Currency Registry UI...\n");

    let registry = CurrencyRegistry::new();
    println!("✓ Seeded {} currencies\n", registry.count());
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(registry.all());
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode() -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin currency-server --features server");
    eprintln!("   Or run a subcommand: currency-registry list | show <code> | numeric <num>");
    std::process::exit(1);
}
