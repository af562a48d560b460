use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::path::Path;

use prep_predict::analyzer;
use prep_predict::branches::{self, BranchProfile};
use prep_predict::dataset;
use prep_predict::error::AppError;
use prep_predict::geo::Geocoder;
use prep_predict::models::{ChanceResult, Config, StudentQuery};
use prep_predict::predictor::{ArtifactBundle, Prediction};
use prep_predict::trainer;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("prep-predict")
        .version("0.1")
        .about("KCET college admission predictor and branch guide")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("predict")
                .about("Shortlist colleges for a rank and category")
                .arg(
                    Arg::new("rank")
                        .long("rank")
                        .required(true)
                        .value_parser(clap::value_parser!(u32).range(1..))
                        .help("KCET rank (1 is best)"),
                )
                .arg(
                    Arg::new("category")
                        .long("category")
                        .help("Category code, e.g. GM, 1G, 2AG (defaults from config)"),
                )
                .arg(
                    Arg::new("no-geocode")
                        .long("no-geocode")
                        .action(ArgAction::SetTrue)
                        .help("Skip the distance lookup in summaries"),
                ),
        )
        .subcommand(Command::new("train").about("Train the college predictor from the dataset"))
        .subcommand(
            Command::new("recommend")
                .about("Recommend branches from interest tags")
                .arg(
                    Arg::new("interests")
                        .long("interests")
                        .required(true)
                        .help("Comma-separated interest tags, e.g. coding,robotics"),
                ),
        )
        .get_matches();

    let config_file = matches.get_one::<String>("config").expect("has default");
    let config = if Path::new(config_file).exists() {
        println!("📋 Loading configuration from: {}", config_file);
        Config::load_from_file(config_file)?
    } else {
        println!("📝 Creating default configuration file: {}", config_file);
        let default_config = Config::default();
        default_config.save_to_file(config_file)?;
        default_config
    };

    match matches.subcommand() {
        Some(("predict", sub)) => {
            let rank = *sub.get_one::<u32>("rank").expect("required");
            let category = sub
                .get_one::<String>("category")
                .cloned()
                .unwrap_or_else(|| config.default_category.clone());
            let geocode = config.enable_geocode && !sub.get_flag("no-geocode");
            run_predict(&config, rank, category, geocode).await
        }
        Some(("train", _)) => run_train(&config),
        Some(("recommend", sub)) => {
            let interests = sub.get_one::<String>("interests").expect("required");
            run_recommend(interests);
            Ok(())
        }
        _ => unreachable!("subcommand is required"),
    }
}

async fn run_predict(config: &Config, rank: u32, category: String, geocode: bool) -> Result<()> {
    let table = dataset::load(Path::new(&config.dataset_file))?;
    println!(
        "📂 Loaded {} offerings, {} categories from {}",
        table.offerings.len(),
        table.categories.len(),
        config.dataset_file
    );

    // The model assist is optional: a missing or broken bundle only
    // drops this section, the filter results below stay available.
    match ArtifactBundle::load(Path::new(&config.model_directory)) {
        Ok(bundle) => {
            println!("✅ Loaded trained model from {}", config.model_directory);
            match bundle.predict_college(rank) {
                Prediction::College(name) => {
                    println!("🤖 Model predicted college (approx): {}", name);
                }
                Prediction::MappingFailed => {
                    println!("⚠️  Model prediction could not be mapped to a college name");
                }
            }
        }
        Err(e) => {
            println!("⚠️  {e}; continuing with cutoff filtering only");
        }
    }

    let query = StudentQuery { rank, category };
    let mut rng = rand::thread_rng();
    let results = match analyzer::shortlist(&table, &query, config.shortlist_size, &mut rng) {
        Ok(results) => results,
        Err(AppError::InvalidCategory {
            category,
            available,
        }) => {
            println!("❌ Unknown category code '{}'", category);
            println!("   Available categories: {}", available.join(", "));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if results.is_empty() {
        println!(
            "❌ No colleges found for rank {} under category {}",
            query.rank, query.category
        );
        return Ok(());
    }

    println!("\n🎯 Top colleges (cutoff & chance score):");
    for (i, result) in results.iter().enumerate() {
        println!(
            "   {}. {} - {} [{}] cutoff {} | chance score {} (~{}%)",
            i + 1,
            result.offering.college,
            result.offering.branch,
            result.offering.cet_code,
            result.cutoff,
            result.chance_score,
            result.chance_percent
        );
    }

    let geocoder = geocode.then(|| Geocoder::new(config.geocode_timeout_secs));
    println!("\n📖 College summaries:");
    for result in &results {
        print_summary(result, query.rank, geocoder.as_ref()).await;
    }

    Ok(())
}

async fn print_summary(result: &ChanceResult, rank: u32, geocoder: Option<&Geocoder>) {
    let offering = &result.offering;
    let distance = match geocoder {
        Some(geocoder) => geocoder
            .distance_from_bangalore_km(&offering.location)
            .await
            .map(|km| format!("{km} km"))
            .unwrap_or_else(|| "N/A".to_string()),
        None => "N/A".to_string(),
    };
    let label = branches::classify_branch(&offering.branch);

    println!("{} - {} ({})", offering.college, offering.branch, label);
    println!(
        "   Location: {} | Distance from Bangalore: {}",
        if offering.location.is_empty() {
            "Unknown"
        } else {
            offering.location.as_str()
        },
        distance
    );
    println!(
        "   Rank considered: {} | Cutoff: {} | Chance: ~{}%",
        rank, result.cutoff, result.chance_percent
    );
    if let Some(profile) = branches::profile_for(label) {
        println!(
            "   Typical careers: {} | Average package: {}",
            profile.careers.join(", "),
            profile.average_package
        );
    }
    println!("   - Placement: Moderate to Good (refer campus reports)");
    println!("   - Hostel: Usually available; fees vary");
    println!("   - Pros: Established program, active placements");
    println!("   - Cons: Competitive intake, limited seats in top branches");
    println!(
        "   Score: {}/10",
        analyzer::summary_score(result.chance_percent)
    );
    println!("   ---");
}

fn run_train(config: &Config) -> Result<()> {
    let table = dataset::load(Path::new(&config.dataset_file))?;
    println!(
        "📂 Loaded {} rows from {}",
        table.offerings.len(),
        config.dataset_file
    );

    let report = trainer::train(&table, Path::new(&config.model_directory))?;
    println!("🌲 Trained {}-class forest", report.n_classes);
    println!("   Features: {}", report.feature_columns.join(", "));
    println!(
        "   Rows: {} train / {} test | held-out accuracy: {:.3}",
        report.n_train, report.n_test, report.accuracy
    );
    println!("💾 Saved model artifacts to {}", config.model_directory);
    Ok(())
}

fn run_recommend(interests: &str) {
    let tags: Vec<String> = interests
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let recommendations = branches::recommend(&tags);
    if recommendations.is_empty() {
        println!("❌ No branches matched those interests");
        return;
    }

    println!("🎓 Recommended branches:");
    for (i, (profile, score)) in recommendations.iter().enumerate() {
        print_profile(i + 1, profile, *score);
    }
}

fn print_profile(position: usize, profile: &BranchProfile, score: usize) {
    println!("\n{}. {} (match score {})", position, profile.label, score);
    println!("   {}", profile.description);
    println!("   Skills: {}", profile.skills.join(", "));
    println!("   Careers: {}", profile.careers.join(", "));
    println!("   Average package: {}", profile.average_package);
}
