use rusqlite::{params, Connection};

use oppsql::schema::SCHEMA;

pub const N_CARS: [i64; 4] = [100, 200, 300, 320];

/// In-memory result database with a small parameter sweep.
///
/// Runs 1 to 8 sweep `nCars` over [`N_CARS`] with repetitions 0 and 1, `speed`
/// is 13.9 for the two smaller and 27.8 for the two larger car counts. Run 9
/// only carries a `repetition` attribute. The parameter `Net.label` keeps
/// surrounding blanks. Every run records the vector
/// `collisions` in `Net.car[0]` with two samples (runId at 1s, runId + 2 at
/// 2s); runs 1 to 8 also record one `speed` sample in `Net.car[1]`.
pub fn setup() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory database");
    seed(&conn);
    conn
}

pub fn seed(conn: &Connection) {
    conn.execute_batch(SCHEMA).expect("schema");
    conn.execute("insert into db (dbId, dbName) values (1, 'General.sqlite')", [])
        .expect("db");
    for run in 1..=9i64 {
        let index = (run - 1) as usize;
        let repetition = index % 2;
        conn.execute(
            "insert into run (dbId, runId, runName, simtimeExp) values (1, ?1, ?2, -12)",
            params![run, format!("General-{}", index)],
        )
        .expect("run");
        attribute(conn, run, "repetition", &repetition.to_string());
        parameter(conn, run, "Net.playgroundSizeX", "1000");
        parameter(conn, run, "Net.label", " left lane ");
        parameter(conn, run, "Net.seed-set", &repetition.to_string());

        conn.execute(
            "insert into vector (dbId, vectorId, runId, moduleName, vectorName) values (1, ?1, ?1, 'Net.car[0]', 'collisions')",
            params![run],
        )
        .expect("vector");
        sample(conn, run, 1, 1_000_000_000_000, run as f64);
        sample(conn, run, 2, 2_000_000_000_000, (run + 2) as f64);

        if run == 9 {
            continue;
        }
        let n_cars = N_CARS[index / 2];
        let speed = if n_cars < 300 { "13.9" } else { "27.8" };
        attribute(conn, run, "nCars", &n_cars.to_string());
        attribute(conn, run, "speed", speed);
        attribute(conn, run, "warmup", if run % 2 == 0 { "true" } else { "false" });
        attribute(conn, run, "iterationvars", &format!("$nCars={}, $speed={}", n_cars, speed));

        conn.execute(
            "insert into vector (dbId, vectorId, runId, moduleName, vectorName) values (1, ?1, ?2, 'Net.car[1]', 'speed')",
            params![100 + run, run],
        )
        .expect("vector");
        sample(conn, 100 + run, 3, 1_500_000_000_000, 5.0);
    }
}

fn attribute(conn: &Connection, run: i64, name: &str, value: &str) {
    conn.execute(
        "insert into runattr (dbId, runId, attrName, attrValue) values (1, ?1, ?2, ?3)",
        params![run, name, value],
    )
    .expect("runattr");
}

fn parameter(conn: &Connection, run: i64, name: &str, value: &str) {
    conn.execute(
        "insert into runparam (dbId, runId, parName, parValue) values (1, ?1, ?2, ?3)",
        params![run, name, value],
    )
    .expect("runparam");
}

fn sample(conn: &Connection, vector: i64, event: i64, simtime_raw: i64, value: f64) {
    conn.execute(
        "insert into vectordata (dbId, vectorId, eventNumber, simtimeRaw, value) values (1, ?1, ?2, ?3, ?4)",
        params![vector, event, simtime_raw, value],
    )
    .expect("vectordata");
}
