use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::{
    cli_types::{ListArgs, NewsArgs, OutputFormat, PhotoArgs, SearchArgs, ShowArgs},
    config::DishbrainConfig,
    error::DishbrainError,
    lookup::{self, Lookups, NewsRequest, PhotoRequest},
    search,
    source::source_from_config,
    storage::ExpertRepository,
    types::{Expert, FilterState, LocationFilter},
    ui::Ui,
};

pub struct CliApp {
    config: DishbrainConfig,
    repository: Arc<ExpertRepository>,
    lookups: Lookups,
    verbose: bool,
    ui: Ui,
}

impl CliApp {
    pub fn new(config: DishbrainConfig, verbose: bool, colors_enabled: bool) -> Result<Self> {
        info!("Initializing Dishbrain CLI");

        let source = source_from_config(&config.source).context("Failed to create expert source")?;
        let lookups = Lookups::from_config(&config.lookup).context("Failed to create lookup clients")?;

        Ok(Self {
            repository: Arc::new(ExpertRepository::new(source)),
            lookups,
            config,
            verbose,
            ui: Ui::new(colors_enabled),
        })
    }

    /// Build an app over an existing repository and lookups.
    pub fn with_parts(config: DishbrainConfig, repository: Arc<ExpertRepository>, lookups: Lookups) -> Self {
        Self {
            config,
            repository,
            lookups,
            verbose: false,
            ui: Ui::new(false),
        }
    }

    pub async fn list(&self, args: ListArgs) -> Result<()> {
        let limit = args.limit.unwrap_or(self.config.loader.initial_chunk);
        let experts = self
            .repository
            .get_chunk(args.offset, limit)
            .await
            .context("Failed to read expert chunk")?;
        let total = self.repository.len().await;

        if args.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&experts)?);
            return Ok(());
        }

        self.ui.print_header("Experts");
        self.warn_if_degraded().await;
        if experts.is_empty() {
            self.ui.print_warning("No experts in this range.");
            return Ok(());
        }

        println!("{}", self.ui.expert_table(&experts));
        let shown_to = args.offset + experts.len();
        self.ui.print_info(&format!("Showing {}-{} of {}", args.offset + 1, shown_to, total));
        if shown_to < total {
            self.ui.print_info(&format!("More available: --offset {}", shown_to));
        }

        Ok(())
    }

    pub async fn search(&self, args: SearchArgs) -> Result<()> {
        let filters = build_filters(&args);
        let corpus = self.repository.get_all().await;
        let results = search::search_with_stats(&args.query, &filters, &corpus);

        if args.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&results.items)?);
            return Ok(());
        }

        self.ui.print_header("Search");
        self.warn_if_degraded().await;
        if self.verbose {
            self.ui.print_info(&format!("Query: {:?}", args.query));
            self.ui.print_info(&format!(
                "Filters: expertise={:?} location={} availability={}",
                filters.expertise, filters.location, filters.availability
            ));
        }

        if results.items.is_empty() {
            self.ui.print_warning("No experts match.");
        } else {
            let experts: Vec<Expert> = results.items.into_iter().cloned().collect();
            println!("{}", self.ui.expert_table(&experts));
            self.ui.print_success(&format!("{} of {} experts match", results.total_matches, corpus.len()));
        }

        if self.verbose {
            self.ui.print_info(&format!("Search completed in {} ms", results.query_duration_ms));
        }

        Ok(())
    }

    pub async fn show(&self, args: ShowArgs) -> Result<()> {
        let mut expert = self
            .repository
            .get(&args.id)
            .await
            .ok_or_else(|| DishbrainError::NotFound(args.id.clone()))?;

        let news_lookup = async {
            if args.news {
                Some(self.lookups.news_for(&expert).await)
            } else {
                None
            }
        };
        let photo_lookup = async {
            let mut enriched = expert.clone();
            if args.photo && lookup::enrich_photo(self.lookups.photo.as_ref(), &mut enriched).await {
                Some(enriched)
            } else {
                None
            }
        };
        let (news, enriched) = futures::join!(news_lookup, photo_lookup);
        if let Some(enriched) = enriched {
            expert = enriched;
        }

        self.ui.print_header("Expert");
        println!("{}", self.ui.expert_details(&expert));

        if let Some(news) = news {
            println!();
            self.ui.print_header("News");
            println!("{}", self.ui.news_list(&news));
        }

        Ok(())
    }

    pub async fn news(&self, args: NewsArgs) -> Result<()> {
        let request = NewsRequest {
            name: args.name,
            company: args.company,
            linkedin_url: args.linkedin,
        };
        let items = lookup::fetch_news(self.lookups.news.as_ref(), &request).await;

        self.ui.print_header(&format!("News: {}", request.name));
        println!("{}", self.ui.news_list(&items));
        Ok(())
    }

    pub async fn photo(&self, args: PhotoArgs) -> Result<()> {
        let request = PhotoRequest {
            name: args.name,
            company: args.company,
            email: args.email,
        };
        let photo = lookup::find_photo(self.lookups.photo.as_ref(), &request).await;

        self.ui.print_header(&format!("Photo: {}", request.name));
        println!("{}", self.ui.photo_line(&photo));
        if let (true, Some(reason)) = (self.verbose, &photo.error) {
            self.ui.print_info(&format!("Lookup said: {}", reason));
        }
        Ok(())
    }

    pub async fn show_config(&self) -> Result<()> {
        self.ui.print_header("Configuration");
        println!("{}", self.config.to_toml().context("Failed to render configuration")?);

        let metadata = self.repository.metadata().await;
        self.ui.print_info("\nRoster Status:");
        self.ui.print_info(&format!("  Source: {}", metadata.source));
        self.ui.print_info(&format!("  Experts loaded: {}", metadata.total_experts));
        self.ui.print_info(&format!("  Institutions: {}", metadata.institutions.len()));
        self.ui.print_info(&format!("  Load time: {} ms", metadata.load_duration_ms));
        if let Some(error) = &metadata.last_error {
            self.ui.print_warning(&format!("  Load failed: {}", error));
        }

        Ok(())
    }

    async fn warn_if_degraded(&self) {
        let metadata = self.repository.metadata().await;
        if metadata.degraded {
            self.ui.print_warning(&format!(
                "Expert roster could not be loaded from {}; showing an empty directory.",
                metadata.source
            ));
        }
    }
}

fn build_filters(args: &SearchArgs) -> FilterState {
    let mut filters = FilterState::new().with_expertise(args.expertise.iter().cloned());
    if let Some(location) = &args.location {
        filters = filters.with_location(LocationFilter::city(location.clone()));
    }
    if let Some(availability) = args.availability {
        filters = filters.with_availability(availability);
    }
    filters
}
