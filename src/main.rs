
use log::{LevelFilter, error, info};
use std::time::Instant;

use meerkat::analyzer::{Analyzer, AnalysisConfigBuilder};
use meerkat::cli::core::{Commands, get_cli};
use meerkat::cli::trio::{TrioSettings, check_trio_settings};
use meerkat::parsing::confidence_tables::load_confidence_tables;
use meerkat::parsing::record::open_record_reader;
use meerkat::util::json_io::save_json;
use meerkat::writers::annotated::open_annotated_writer;
use meerkat::writers::quality_tables::write_quality_tables;
use meerkat::writers::summary::SummaryWriter;

fn run_trio(settings: TrioSettings) {
    // start the timer
    let start_time = Instant::now();

    // set up logging before we check the other settings
    let filter_level: LevelFilter = match settings.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    let settings = match check_trio_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    // create the primary output folder
    info!("Creating output folder at {:?}...", settings.output_folder);
    match std::fs::create_dir_all(&settings.output_folder) {
        Ok(()) => {},
        Err(e) => {
            error!("Error while creating output folder: {e}");
            std::process::exit(exitcode::IOERR);
        }
    }

    // save the CLI options
    let cli_json = settings.output_folder.join("cli_settings.json");
    info!("Saving CLI options to {cli_json:?}...");
    if let Err(e) = save_json(&settings, &cli_json) {
        error!("Error while saving CLI options: {e}");
        std::process::exit(exitcode::IOERR);
    }

    // load the confidence tables from a previous pass, if we were given any
    let estimator = settings.confidence_folder.as_deref().map(|table_folder| {
        info!("Pre-loading confidence tables into memory...");
        match load_confidence_tables(table_folder) {
            Ok(e) => e,
            Err(e) => {
                error!("Error while loading confidence tables: {e:#}");
                std::process::exit(exitcode::IOERR);
            }
        }
    });

    // build our configuration
    let analysis_config = match AnalysisConfigBuilder::default()
        .variant_filter(settings.variant_filter)
        .min_event_size(settings.min_event_size)
        .max_event_size(settings.max_event_size)
        .pindel_mode(settings.pindel_mode)
        .min_confidence(settings.min_confidence)
        .build() {
        Ok(ac) => ac,
        Err(e) => {
            error!("Error while building analysis config: {e:?}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    // open the input and the annotated output copy
    let record_reader = match open_record_reader(&settings.input_filename) {
        Ok(rr) => rr,
        Err(e) => {
            error!("Error while opening input file: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };

    let annotated_fn = settings.output_folder.join("annotated.vcf");
    info!("Opening annotated output at {annotated_fn:?}...");
    let mut annotated_writer = match open_annotated_writer(&annotated_fn) {
        Ok(aw) => aw,
        Err(e) => {
            error!("Error while opening annotated output: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };

    // run the single sequential pass over the records
    info!("Analyzing trio records...");
    let mut analyzer = Analyzer::new(analysis_config, estimator);
    if let Err(e) = analyzer.analyze(record_reader, &mut annotated_writer) {
        error!("Error while analyzing records: {e:#}");
        std::process::exit(exitcode::DATAERR);
    }

    if let Err(e) = annotated_writer.into_inner() {
        error!("Error while finalizing annotated output: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    // report the counting results
    let counts = analyzer.counts();
    info!("Scored events: {}", counts.scored_events);
    info!("Events with 0, 1, 2 and 3 trios genotyped: {} {} {} {}",
        counts.trio_genotyped_events[0], counts.trio_genotyped_events[1],
        counts.trio_genotyped_events[2], counts.trio_genotyped_events[3]);
    info!("Events with all samples genotyped: {}", counts.fully_genotyped_events);
    info!("Unassessable trios: {}", counts.unassessable_trios);
    info!("Pure homref trios: {}", counts.homref_trios);
    info!("Mendelian correct: {}", counts.mendelian_correct);
    info!("Mendelian error: {}", counts.mendelian_error);
    if let Some(error_rate) = counts.mendelian_error_rate() {
        info!("Mendelian error rate: {:.4}%", 100.0 * error_rate);
    }
    if let Some(error_rate) = counts.mendelian_error_rate_with_homref() {
        info!("Mendelian error rate including all-homref trios: {:.4}%", 100.0 * error_rate);
    }
    info!("Calls (unknown : homref : variant): {} : {} : {}",
        counts.unknown_calls, counts.homref_calls, counts.variant_calls);
    for (pattern_key, count) in analyzer.error_patterns().sorted_counts() {
        info!("\t{pattern_key}: {count}");
    }

    // now write things
    let summary_writer = SummaryWriter::new(settings.analysis_label.clone());
    let summary_fn = settings.output_folder.join("summary.tsv");
    info!("Saving output summary to {summary_fn:?}...");
    if let Err(e) = summary_writer.write_summary(&summary_fn, counts) {
        error!("Error while saving summary file: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    let patterns_fn = settings.output_folder.join("error_patterns.tsv");
    info!("Saving error patterns to {patterns_fn:?}...");
    if let Err(e) = summary_writer.write_error_patterns(&patterns_fn, analyzer.error_patterns()) {
        error!("Error while saving error pattern file: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    info!("Saving quality tables to {:?}...", settings.output_folder);
    if let Err(e) = write_quality_tables(analyzer.aggregator(), &settings.output_folder) {
        error!("Error while saving quality tables: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    info!("Analysis completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Trio(settings) => {
            run_trio(*settings);
        }
    }

    info!("Process finished successfully.");
}
