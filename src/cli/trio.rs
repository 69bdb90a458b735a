
use anyhow::bail;
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::analyzer::VariantFilter;
use crate::cli::core::{check_optional_filename, check_required_filename, AFTER_HELP, FULL_VERSION};
use crate::parsing::confidence_tables::{
    COVERAGE_TABLE_FILENAME, EVENTTYPE_TABLE_FILENAME, VAF_TABLE_FILENAME
};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct TrioSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    meerkat_version: String,

    /// Trio variant call file, whitespace-delimited with samples in (parent, parent, child) order
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input")]
    #[clap(value_name = "VCF")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_filename: PathBuf,

    /// Output directory containing the summary, annotated copy, and quality tables
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_folder: PathBuf,

    /// Directory with confidence tables from a previous pass; enables call suppression
    #[clap(short = 'c')]
    #[clap(long = "confidence-tables")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub confidence_folder: Option<PathBuf>,

    /// Optional analysis label for the summary output
    #[clap(long = "analysis-label")]
    #[clap(value_name = "LABEL")]
    #[clap(help_heading = Some("Input/Output"))]
    #[clap(default_value = "trio")]
    pub analysis_label: String,

    /// Decode sample support with the pindel sentinel conventions (-1 and 0,0 payloads)
    #[clap(long = "pindel")]
    #[clap(help_heading = Some("Analysis parameters"))]
    pub pindel_mode: bool,

    /// The class of variant records to analyze
    #[clap(long = "variant-type")]
    #[clap(value_name = "TYPE")]
    #[clap(help_heading = Some("Analysis parameters"))]
    #[clap(default_value = "all")]
    pub variant_filter: VariantFilter,

    /// The minimum event size (bp) to analyze
    #[clap(long = "min-size")]
    #[clap(value_name = "BP")]
    #[clap(help_heading = Some("Analysis parameters"))]
    #[clap(default_value = "0")]
    pub min_event_size: usize,

    /// The maximum event size (bp) to analyze; 0 means unbounded
    #[clap(long = "max-size")]
    #[clap(value_name = "BP")]
    #[clap(help_heading = Some("Analysis parameters"))]
    #[clap(default_value = "0")]
    pub max_event_size: usize,

    /// Calls with an estimated confidence below this are treated as unknown
    #[clap(long = "min-confidence")]
    #[clap(value_name = "FLOAT")]
    #[clap(help_heading = Some("Analysis parameters"))]
    #[clap(default_value = "0.0")]
    pub min_confidence: f64,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_trio_settings(mut settings: TrioSettings) -> anyhow::Result<TrioSettings> {
    // hard code the version in
    settings.meerkat_version = FULL_VERSION.clone();
    info!("Meerkat version: {:?}", &settings.meerkat_version);
    info!("Sub-command: trio");
    info!("Inputs:");

    // check for all the required input files
    check_required_filename(&settings.input_filename, "Input VCF")?;
    info!("\tInput VCF: {:?}", &settings.input_filename);

    check_optional_filename(settings.confidence_folder.as_deref(), "Confidence table folder")?;
    if let Some(confidence_folder) = settings.confidence_folder.as_deref() {
        // each of the three tables from the previous pass must be present
        for table_filename in [COVERAGE_TABLE_FILENAME, VAF_TABLE_FILENAME, EVENTTYPE_TABLE_FILENAME] {
            check_required_filename(&confidence_folder.join(table_filename), "Confidence table")?;
        }
        info!("\tConfidence tables: {confidence_folder:?}");
    } else {
        info!("\tConfidence tables: None");
    }

    // outputs
    info!("Outputs:");
    info!("\tAnalysis label: {:?}", &settings.analysis_label);
    info!("\tOutput folder: {:?}", &settings.output_folder);

    // 0 is just a sentinel for unbounded
    if settings.max_event_size == 0 {
        settings.max_event_size = usize::MAX;
    }
    if settings.max_event_size < settings.min_event_size {
        bail!("--max-size must be >= --min-size");
    }

    info!("Analysis parameters:");
    info!("\tPindel mode: {}", if settings.pindel_mode { "ENABLED" } else { "DISABLED" });
    info!("\tVariant type: {}", settings.variant_filter);
    info!("\tEvent size range: [{}, {}]", settings.min_event_size,
        if settings.max_event_size == usize::MAX { "inf".to_string() } else { settings.max_event_size.to_string() });

    if !(0.0..=1.0).contains(&settings.min_confidence) {
        bail!("--min-confidence must be within [0, 1]");
    }
    if settings.min_confidence > 0.0 && settings.confidence_folder.is_none() {
        bail!("--min-confidence requires --confidence-tables from a previous pass");
    }
    info!("\tMinimum call confidence: {}", settings.min_confidence);

    Ok(settings)
}
