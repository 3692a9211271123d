pub mod core;
pub mod storage;
pub mod schema;
pub mod matrix;
pub mod digest;
pub mod scoring;
pub mod mmap;

/*
┌──────────────────────────────────────────────────────────────────────────────┐
│                           MOWSEDB STRUCT ARCHITECTURE                        │
└──────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────── CORE LAYER ─────────────────────────────────┐
│                                                                              │
│  ┌────────────────────────────────────────────────────────────────────────┐  │
│  │                        struct MowseDatabase                            │  │
│  │  path: PathBuf                    // Store directory                   │  │
│  │  config: Config                   // Runtime settings                  │  │
│  │  store: Option<Store>             // None once closed                  │  │
│  │  matrix: Option<MowseMatrix>      // None once closed                  │  │
│  └────────────────────────────────────────────────────────────────────────┘  │
│                                                                              │
│  ┌──────────────────┐  ┌──────────────────┐  ┌───────────────────────────┐   │
│  │ ProteinRange     │  │ MowseInterval    │  │ struct MatrixStats        │   │
│  │ PeptideRange     │  │ • protein: i64   │  │ • buckets, cells, rows    │   │
│  │ • min, max: i64  │  │ • peptide: i64   │  │ • largest_cell            │   │
│  └──────────────────┘  └──────────────────┘  └───────────────────────────┘   │
└──────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── MATRIX LAYER ────────────────────────────────┐
│                                                                              │
│  MowseMatrix ── indexes: Indexes      // mass -> bucket                      │
│      │       ── schema: RowSchema     // one layout for every cell           │
│      ├── protein: MatrixView ──► /mowsematrix/protein/{p}/{q}   (tables)     │
│      └── peptide: MatrixView ──► /mowsematrix/peptide/{q}/{p}   (hard links) │
│                                                                              │
│  Axis<'a>  // borrowed view + matrix + store, built per lookup               │
└──────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── STORAGE LAYER ───────────────────────────────┐
│                                                                              │
│  Store ── layout: StorageLayout    // .lock, meta/, tables/                  │
│        ── catalog: Catalog         // node arena + schemas, bincode + crc32  │
│        ── writers: LruCache<TableId, TableWriter>                            │
│        ── _lock: FileLock          // flock(LOCK_EX)                         │
│                                                                              │
│  tables/{uuid}.tbl:  [ TableHeader 32B ][ row ][ row ] ...                   │
└──────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────── DIGEST / SCORING ─────────────────────────────┐
│  ProteinSource ─► Protease (Enzyme) ─► ModificationSelection ─► insert()     │
│  FrequencyTable ─► MowseScorer                                               │
└──────────────────────────────────────────────────────────────────────────────┘
*/
