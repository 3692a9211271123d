use mowsedb::core::config::Config;
use mowsedb::core::database::MowseDatabase;
use mowsedb::core::types::AxisName;
use mowsedb::digest::modification::ModificationSelection;
use mowsedb::digest::protease::{Enzyme, Protease};
use mowsedb::digest::source::{InMemoryProteins, ProteinRecord, ProteinSource};
use mowsedb::schema::schema::PeptideQuery;
use mowsedb::scoring::mowse::{FrequencyTable, MowseScorer};

const MOTIF: &str = "ACDEFGHIKLMNPQRSTVWY";

fn config() -> Config {
    Config {
        protein_interval: 5_000,
        peptide_interval: 500,
        minimum_peptide_mass: 500.0,
        maximum_peptide_mass: 4_000.0,
        maximum_peptide_length: 30,
        protein_identifier_length: 12,
        missed_cleavages: 1,
        minimum_peptide_length: 5,
        max_variable_mods: 1,
        ..Config::default()
    }
}

fn source() -> InMemoryProteins {
    InMemoryProteins::new(vec![
        ProteinRecord::new("SMALL", MOTIF.repeat(5)).unwrap(),
        ProteinRecord::new("MEDIUM", MOTIF.repeat(12)).unwrap(),
        ProteinRecord::new("sp|LARGE|VERY_LONG_NAME", MOTIF.repeat(25)).unwrap(),
    ])
}

#[test]
fn populated_rows_land_in_their_cells() {
    let dir = tempfile::tempdir().unwrap();
    let source = source();
    let (db, summary) =
        MowseDatabase::from_proteins(&source, dir.path(), config(), &ModificationSelection::default()).unwrap();

    assert_eq!(summary.proteins, 3);
    assert!(summary.inserted > 0);
    assert_eq!(db.stats().unwrap().rows, summary.inserted);

    let (min, max) = source.mass_range().unwrap();
    let matrix = db.matrix().unwrap();
    assert_eq!(matrix.protein_range().min, min as i64);
    assert_eq!(matrix.protein_range().max, max as i64);

    let indexes = *matrix.indexes();
    for record in &source.records {
        let axis = db.get_size(AxisName::Protein, record.mass).unwrap();
        for q in indexes.peptide_rows() {
            for row in db.read_cell(axis.get_cell(q).unwrap()).unwrap() {
                assert_eq!(indexes.bucket_index(row.mass, AxisName::Peptide), q);
                assert!(row.mass >= 500.0 && row.mass <= 4_000.0);
            }
        }
    }
}

#[test]
fn rows_carry_digest_details() {
    let dir = tempfile::tempdir().unwrap();
    let source = source();
    let (db, _) =
        MowseDatabase::from_proteins(&source, dir.path(), config(), &ModificationSelection::default()).unwrap();

    let medium = &source.records[1];
    let enzyme = Enzyme::trypsin(&config()).unwrap();
    let digest = enzyme
        .digest(&medium.sequence)
        .into_iter()
        .find(|d| d.sequence == "ACDEFGHIK")
        .unwrap();

    // ACDEFGHIK carries a fixed carbamidomethyl on C
    let unmodified = mowsedb::digest::mass::monoisotopic_mass("ACDEFGHIK").unwrap();
    let mass = unmodified + 57.021464;
    let rows = db.rows_at(AxisName::Protein, medium.mass, mass).unwrap();
    let row: &PeptideQuery = rows
        .iter()
        .find(|r| r.id == "MEDIUM" && r.sequence == "ACDEFGHIK" && r.start == digest.start as i64)
        .unwrap();
    assert_eq!(row.mods[2], 4);
    assert!((row.mass - mass).abs() < 1e-6);

    // The same rows through the peptide view
    let via_peptide = db.rows_at(AxisName::Peptide, mass, medium.mass).unwrap();
    assert_eq!(rows, via_peptide);
}

#[test]
fn long_identifiers_are_truncated_to_the_column() {
    let dir = tempfile::tempdir().unwrap();
    let source = source();
    let (db, _) =
        MowseDatabase::from_proteins(&source, dir.path(), config(), &ModificationSelection::none()).unwrap();

    let large = &source.records[2];
    let axis = db.get_size(AxisName::Protein, large.mass).unwrap();
    let indexes = *db.matrix().unwrap().indexes();
    let ids: Vec<String> = indexes
        .peptide_rows()
        .flat_map(|q| db.read_cell(axis.get_cell(q).unwrap()).unwrap())
        .map(|r| r.id)
        .collect();
    assert!(!ids.is_empty());
    assert!(ids.iter().all(|id| id == "sp|LARGE|VER"));
}

#[test]
fn custom_protease_is_used() {
    struct WholeProtein;

    impl Protease for WholeProtein {
        fn name(&self) -> &str {
            "none"
        }

        fn digest(&self, sequence: &str) -> Vec<mowsedb::digest::protease::Digest> {
            vec![mowsedb::digest::protease::Digest {
                sequence: sequence.to_string(),
                start: 0,
                missed_cleavages: 0,
            }]
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let source = InMemoryProteins::new(vec![ProteinRecord::new("TINY", "GGGGGGGGGGK").unwrap()]);
    let (db, summary) = MowseDatabase::from_proteins_with(
        &source,
        &WholeProtein,
        dir.path(),
        config(),
        &ModificationSelection::none(),
    )
    .unwrap();

    assert_eq!(summary.peptides, 1);
    assert_eq!(summary.inserted, 1);
    assert_eq!(db.stats().unwrap().non_empty_cells, 1);
}

#[test]
fn mowse_scores_favour_rare_peptides() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        protein_interval: 10_000,
        peptide_interval: 1_000,
        ..config()
    };
    let mut db = MowseDatabase::new(10_000.0, 100_000.0, dir.path(), config).unwrap();

    let row = |mass: f64| PeptideQuery {
        id: "P".to_string(),
        sequence: "PEPTIDEK".to_string(),
        mods: vec![0; 10],
        start: 0,
        mass,
    };
    for _ in 0..4 {
        db.insert(55_000.0, &row(2_500.0)).unwrap();
    }
    db.insert(55_000.0, &row(3_500.0)).unwrap();

    let scorer = MowseScorer::new(FrequencyTable::build(&db).unwrap());
    let base = 50_000.0 / 55_000.0;

    assert!((scorer.score(55_000.0, &[]).unwrap() - base).abs() < 1e-9);
    assert!((scorer.score(55_000.0, &[2_500.0]).unwrap() - base).abs() < 1e-9);
    assert!((scorer.score(55_000.0, &[3_500.0]).unwrap() - base * 4.0).abs() < 1e-9);
    assert!((scorer.score(55_000.0, &[1_500.0]).unwrap() - base / MowseScorer::DEFAULT_FLOOR).abs() < 1e-6);
    assert!(scorer.score(0.0, &[2_500.0]).is_err());
}

#[test]
fn population_filters_are_counted() {
    // Trypsin fragments: below the mass floor, above the ceiling, admitted,
    // too long for the sequence column, and ambiguous
    let sequence = "GGGGGGGK\
                    WWWWWWWWK\
                    GGGGGGGGK\
                    AAAAAAAAAAAAAK\
                    GGXGGK";
    let source = InMemoryProteins::new(vec![ProteinRecord::new("MIXED", sequence).unwrap()]);
    let enzyme = Enzyme::new("Trypsin", "KR", Some('P'), 0, 1, 100).unwrap();
    let config = Config {
        minimum_peptide_mass: 545.9,
        maximum_peptide_mass: 1_500.0,
        maximum_peptide_length: 12,
        ..config()
    };

    let dir = tempfile::tempdir().unwrap();
    let (db, summary) = MowseDatabase::from_proteins_with(
        &source,
        &enzyme,
        dir.path(),
        config,
        &ModificationSelection::none(),
    )
    .unwrap();

    assert_eq!(summary.proteins, 1);
    assert_eq!(summary.peptides, 5);
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.skipped_mass, 2);
    assert_eq!(summary.skipped_length, 1);
    assert_eq!(summary.skipped_residue, 1);

    // 545.2558 Da sits in a bucket the grid has but under the 545.9 floor
    let light = mowsedb::digest::mass::monoisotopic_mass("GGGGGGGK").unwrap();
    assert!(light < 545.9 && light > 545.0);
    let rows = db.rows_at(AxisName::Protein, source.records[0].mass, light).unwrap();
    assert!(rows.iter().all(|r| r.sequence != "GGGGGGGK"));

    assert_eq!(db.stats().unwrap().rows, 1);
    let admitted = mowsedb::digest::mass::monoisotopic_mass("GGGGGGGGK").unwrap();
    let rows = db.rows_at(AxisName::Protein, source.records[0].mass, admitted).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].sequence, "GGGGGGGGK");
}

#[test]
fn fasta_with_ambiguous_residues_populates() {
    let fasta = ">sp|P1|A\nmkwvtfxsllkGGGGGGGGK\n>sp|P2|B\nGGGGKGGGGGGGGK*\n";
    let source = InMemoryProteins::from_fasta(fasta.as_bytes()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let config = Config { missed_cleavages: 0, ..config() };
    let (_, summary) =
        MowseDatabase::from_proteins(&source, dir.path(), config, &ModificationSelection::none()).unwrap();

    assert_eq!(summary.proteins, 2);
    // WVTFXSLLK carries the ambiguity code, GGGGK is too light
    assert_eq!(summary.skipped_residue, 1);
    assert_eq!(summary.skipped_mass, 1);
    assert_eq!(summary.inserted, 2);
}

#[test]
fn scoring_rejects_non_finite_masses() {
    let dir = tempfile::tempdir().unwrap();
    let db = MowseDatabase::new(10_000.0, 100_000.0, dir.path(), config()).unwrap();
    let scorer = MowseScorer::new(FrequencyTable::build(&db).unwrap());

    assert!(scorer.score(f64::NAN, &[]).is_err());
    assert!(scorer.score(55_000.0, &[f64::NAN]).is_err());
    assert!(scorer.score(55_000.0, &[f64::INFINITY]).is_err());
}
