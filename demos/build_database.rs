/// Build a MOWSE database from a FASTA file and score a peptide mass list
///
/// Usage: cargo run --example build_database -- [proteins.fasta] [output-dir]
///
/// Without arguments a small built-in FASTA is used and the database is
/// written to ./mowse-data.

use mowsedb::core::config::Config;
use mowsedb::core::database::MowseDatabase;
use mowsedb::core::types::AxisName;
use mowsedb::digest::modification::ModificationSelection;
use mowsedb::digest::source::InMemoryProteins;
use mowsedb::scoring::mowse::{FrequencyTable, MowseScorer};
use std::fs::File;
use std::io::BufReader;

const DEMO_FASTA: &str = "\
>sp|P02769|ALBU_BOVIN Serum albumin
MKWVTFISLLLLFSSAYSRGVFRRDTHKSEIAHRFKDLGEEHFKGLVLIAFSQYLQQCPFDEHVKLVNELTEFAKTCVADESHAGCEKSLHTLFGDELCKVASLRETYGDMADCCEKQEPERNECFLSHKDDSPDLPKLKPDPNTLCDEFKADEKKFWGKYLYEIARRHPYFYAPELLYYANKYNGVFQECCQAEDKGACLLPKIETMREKVLASSARQRLRCASIQKFGERALKAWSVARLSQKFPKAEFVEVTKLVTDLTKVHKECCHGDLLECADDRADLAKYICDNQDTISSKLKECCDKPLLEKSHCIAEVEKDAIPENLPPLTADFAEDKDVCKNYQEAKDAFLGSFLYEYSRRHPEYAVSVLLRLAKEYEATLEECCAKDDPHACYSTVFDKLKHLVDEPQNLIKQNCDQFEKLGEYGFQNALIVRYTRKVPQVSTPTLVEVSRSLGKVGTRCCTKPESERMPCTEDYLSLILNRLCVLHEKTPVSEKVTKCCTESLVNRRPCFSALTPDETYVPKAFDEKLFTFHADICTLPDTEKQIKKQTALVELLKHKPKATEEQLKTVMENFVAFVDKCCAADDKEACFAVEGPKLVVSTQTALA
>sp|P00761|TRYP_PIG Trypsin
FPTDDDDKIVGGYTCAANSIPYQVSLNSGSHFCGGSLINSQWVVSAAHCYKSRIQVRLGEHNIDVLEGNEQFINAAKIITHPNFNGNTLDNDIMLIKLSSPATLNSRVATVSLPRSCAAAGTECLISGWGNTKSSGSSYPSLLQCLKAPVLSDSSCKSSYPGQITGNMICVGFLEGGKDSCQGDSGGPVVCNGQLQGIVSWGYGCAQKNKPGVYTKVCNYVNWIQQTIAAN
>sp|P00698|LYSC_CHICK Lysozyme C
MRSLLILVLCFLPLAALGKVFGRCELAAAMKRHGLDNYRGYSLGNWVCAAKFESNFNTQATNRNTDGSTDYGILQINSRWWCNDGRTPGSRNLCNIPCSALLSSDITASVNCAKKIVSDGNGMNAWVAWRNRCKGTDVQAWIRGCRL
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n╔═══════════════════════════════════════════════╗");
    println!("║        MOWSE Database - Build and Score       ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    let args: Vec<String> = std::env::args().collect();
    let source = match args.get(1) {
        Some(fasta) => InMemoryProteins::from_fasta(BufReader::new(File::open(fasta)?))?,
        None => InMemoryProteins::from_fasta(DEMO_FASTA.as_bytes())?,
    };
    let output = args.get(2).cloned().unwrap_or_else(|| "./mowse-data".to_string());
    if std::path::Path::new(&output).exists() {
        println!("Removing previous database at {}", output);
        std::fs::remove_dir_all(&output)?;
    }

    // Step 1: Build
    println!("Digesting {} proteins...", source.records.len());
    let config = Config {
        protein_interval: 10_000,
        ..Config::default()
    };
    let (mut db, summary) = MowseDatabase::from_proteins(&source, &output, config.clone(), &ModificationSelection::default())?;
    println!("  Peptides digested:  {}", summary.peptides);
    println!("  Rows inserted:      {}", summary.inserted);
    println!("  Skipped (mass):     {}", summary.skipped_mass);
    println!("  Skipped (length):   {}", summary.skipped_length);
    println!("  Skipped (residue):  {}\n", summary.skipped_residue);

    // Step 2: Statistics
    let stats = db.stats()?;
    println!("Grid statistics:");
    println!("  Protein range:      {}..{} Da", stats.protein_range.min, stats.protein_range.max);
    println!("  Buckets:            {} x {}", stats.protein_buckets, stats.peptide_buckets);
    println!("  Cells:              {} ({:.1}% filled)", stats.cells, stats.fill_ratio() * 100.0);
    if let Some((point, rows)) = stats.largest_cell {
        println!("  Largest cell:       ({}, {}) with {} rows", point.protein, point.peptide, rows);
    }
    println!();

    // Step 3: Look up through both views
    let albumin = &source.records[0];
    let peptide_mass = 1_162.62;
    let rows = db.rows_at(AxisName::Protein, albumin.mass, peptide_mass)?;
    println!("Rows near {:.2} Da in the {:.0} Da protein bucket: {}", peptide_mass, albumin.mass, rows.len());
    for row in rows.iter().take(5) {
        println!("  {:<24} {:<30} {:>10.4}", row.id, row.sequence, row.mass);
    }
    let via_peptide = db.rows_at(AxisName::Peptide, peptide_mass, albumin.mass)?;
    println!("Same cell via peptide view: {} rows\n", via_peptide.len());

    // Step 4: Score
    let scorer = MowseScorer::new(FrequencyTable::build(&db)?);
    let observed = [927.49, 1_162.62, 1_479.80, 1_567.74];
    for record in &source.records {
        let score = scorer.score(record.mass, &observed)?;
        println!("  {:<24} MOWSE score {:>14.2}", record.id, score);
    }

    // Step 5: Close and reopen
    db.close()?;
    let reopened = MowseDatabase::open(&output, config)?;
    println!("\nReopened with {} rows", reopened.stats()?.rows);

    Ok(())
}
