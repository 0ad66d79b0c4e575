use anyhow::{Context, Result};

use reelcost::config::Config;
use reelcost::crawler::DirectorCrawler;
use reelcost::models::DirectorReport;
use reelcost::utils::format_money;

/// Price each director in turn and print the reports
///
/// `None` means the configured default services; `Some` is used as given,
/// including an empty list.
pub async fn price(
    config: &Config,
    directors: &[String],
    services: Option<Vec<String>>,
    json: bool,
) -> Result<()> {
    let crawler = DirectorCrawler::new(config).await?;
    let services = services.unwrap_or_else(|| config.server.streaming_services.clone());

    for director in directors {
        let report = crawler.scrape_director(director, &services).await;

        if json {
            let out = serde_json::to_string_pretty(&report)
                .context("Failed to serialize report")?;
            println!("{out}");
        } else {
            print_report(&report);
        }
    }

    Ok(())
}

/// Print every director recorded in the cache
pub async fn directors(config: &Config) -> Result<()> {
    let crawler = DirectorCrawler::new(config).await?;
    let directors = crawler.known_directors().await;

    if directors.is_empty() {
        println!("No directors priced yet.");
    }
    for name in directors {
        println!("{name}");
    }

    Ok(())
}

/// Print the default streaming services
pub fn services(config: &Config) {
    for service in &config.server.streaming_services {
        println!("{service}");
    }
}

fn print_report(report: &DirectorReport) {
    println!("{}", report.director);
    println!("{:=<60}", "");

    for film in &report.films {
        let details = &film.film_details;
        let year = if details.year > 0 {
            details.year.to_string()
        } else {
            "----".to_string()
        };

        let offer = if film.is_streaming() {
            let names: Vec<&str> = film.streaming.iter().map(|e| e.service_name.as_str()).collect();
            format!("streaming on {}", names.join(", "))
        } else if let Some(rental) = &film.cheapest_rental {
            format!(
                "rent on {} ({}) for {}",
                rental.service_name,
                rental.format,
                format_money(rental.price)
            )
        } else {
            "not available".to_string()
        };

        println!("  {year}  {:<32} {offer}", details.name);
    }

    println!("{:-<60}", "");
    println!("  {}", report.price_details);

    if !report.failures.is_empty() {
        println!();
        println!("  {} film(s) could not be priced:", report.failures.len());
        for failure in &report.failures {
            let name = if failure.film_name.is_empty() {
                failure.film_id.as_str()
            } else {
                failure.film_name.as_str()
            };
            println!("    [{}] {}: {}", failure.category, name, failure.message);
        }
    }
    println!();
}
