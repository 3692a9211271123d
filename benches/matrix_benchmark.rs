use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mowsedb::core::config::Config;
use mowsedb::core::database::MowseDatabase;
use mowsedb::core::types::AxisName;
use mowsedb::schema::schema::PeptideQuery;
use rand::Rng;

fn bench_config() -> Config {
    Config {
        protein_interval: 10_000,
        peptide_interval: 1_000,
        ..Config::default()
    }
}

/// Random peptide row inside the default peptide range
fn random_row(rng: &mut impl Rng) -> PeptideQuery {
    let residues = b"ACDEFGHIKLMNPQRSTVWY";
    let len = rng.gen_range(6..20);
    let sequence: String = (0..len)
        .map(|_| residues[rng.gen_range(0..residues.len())] as char)
        .collect();

    PeptideQuery {
        id: format!("P{:05}", rng.gen_range(0..100_000)),
        mods: vec![0; sequence.len() + 2],
        sequence,
        start: rng.gen_range(0..1_000),
        mass: rng.gen_range(500.0..5_000.0),
    }
}

/// Grid allocation for growing protein ranges
fn bench_set_dimensions(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_dimensions");
    group.sample_size(10);

    for max_mass in [50_000.0, 100_000.0, 200_000.0].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(*max_mass as u64), max_mass, |b, &max_mass| {
            b.iter(|| {
                let dir = tempfile::tempdir().unwrap();
                let mut db = MowseDatabase::new(10_000.0, max_mass, dir.path(), bench_config()).unwrap();
                db.close().unwrap();
            });
        });
    }

    group.finish();
}

/// Cell lookup through each view
fn bench_cell_lookup(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let db = MowseDatabase::new(10_000.0, 200_000.0, dir.path(), bench_config()).unwrap();
    let mut rng = rand::thread_rng();

    c.bench_function("cell_lookup_protein_view", |b| {
        b.iter(|| {
            let protein_mass = rng.gen_range(10_000.0..200_000.0);
            let peptide_mass = rng.gen_range(500.0..5_000.0);
            let axis = db.get_size(AxisName::Protein, black_box(protein_mass)).unwrap();
            black_box(axis.get_size(peptide_mass).unwrap());
        });
    });

    c.bench_function("cell_lookup_peptide_view", |b| {
        b.iter(|| {
            let protein_mass = rng.gen_range(10_000.0..200_000.0);
            let peptide_mass = rng.gen_range(500.0..5_000.0);
            let axis = db.get_size(AxisName::Peptide, black_box(peptide_mass)).unwrap();
            black_box(axis.get_size(protein_mass).unwrap());
        });
    });
}

/// Row insertion spread across the grid
fn bench_insert(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let mut db = MowseDatabase::new(10_000.0, 200_000.0, dir.path(), bench_config()).unwrap();
    let mut rng = rand::thread_rng();

    c.bench_function("insert_row", |b| {
        b.iter(|| {
            let row = random_row(&mut rng);
            let protein_mass = rng.gen_range(10_000.0..200_000.0);
            db.insert(protein_mass, black_box(&row)).unwrap();
        });
    });

    db.close().unwrap();
}

criterion_group!(benches, bench_set_dimensions, bench_cell_lookup, bench_insert);
criterion_main!(benches);
