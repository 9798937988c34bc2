// ==========================================
// 演示数据库: 重置并载入示例车间
// ==========================================
// 用法: seed_demo_db [DB_PATH]
// 工段链: Raw Material -> Processing -> Finishing -> Packaging
// 已存在的库文件先备份为 <path>.bak.<时间戳>
// ==========================================

use chrono::{Duration, Local};
use rusqlite::{params, Connection};
use std::error::Error;
use std::fs;
use std::path::Path;

use shopfloor_mis::app::get_default_db_path;
use shopfloor_mis::db::{format_date, format_datetime, init_schema, open_sqlite_connection};
use shopfloor_mis::i18n::t_with_args;
use shopfloor_mis::logging;

const SECTIONS: [(i64, &str, Option<i64>); 4] = [
    (1, "Raw Material", Some(2)),
    (2, "Processing", Some(3)),
    (3, "Finishing", Some(4)),
    (4, "Packaging", None),
];

const WORKERS: [(&str, i64); 8] = [
    ("Beer Bahadur", 1),
    ("Gita Devi", 1),
    ("Ram Prasad", 2),
    ("Sita Kumari", 2),
    ("Hari Krishna", 3),
    ("Lakshmi Sharma", 3),
    ("Krishna Thapa", 4),
    ("Maya Rai", 4),
];

const ITEMS: [(&str, &str, i64); 5] = [
    ("Raw Cotton", "kg", 500),
    ("Processed Yarn", "kg", 450),
    ("Finished Fabric", "meters", 1000),
    ("Packaged Rolls", "units", 50),
    ("Thread Spools", "units", 200),
];

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);

    backup_and_reset_db(&db_path)?;

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;
    seed_demo(&conn)?;
    print_quick_counts(&conn)?;

    println!("{}", t_with_args("cli.seeded", &[("path", &db_path)]));
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

fn seed_demo(conn: &Connection) -> Result<(), Box<dyn Error>> {
    let today = Local::now().date_naive();
    let yesterday = today - Duration::days(1);
    let now = Local::now().naive_local();

    let tx = conn.unchecked_transaction()?;

    // 先插链尾，保证 next_section_id 外键已存在
    for (id, name, next) in SECTIONS.iter().rev() {
        tx.execute(
            "INSERT INTO sections (id, name, next_section_id) VALUES (?1, ?2, ?3)",
            params![id, name, next],
        )?;
    }

    for (name, section_id) in WORKERS {
        tx.execute(
            "INSERT INTO workers (name, section_id) VALUES (?1, ?2)",
            params![name, section_id],
        )?;
    }

    for (name, unit, target) in ITEMS {
        tx.execute(
            "INSERT INTO items (name, unit, default_target) VALUES (?1, ?2, ?3)",
            params![name, unit, target],
        )?;
    }

    // (worker, item, section, date, target, actual, input, output, overtime)
    let logs = [
        (1, 1, 1, yesterday, 500, 480, 500.0, 480.0, 1.5),
        (3, 2, 2, yesterday, 450, 440, 480.0, 440.0, 2.0),
        (2, 1, 1, today, 500, 490, 500.0, 490.0, 0.5),
    ];
    for (worker, item, section, date, target, actual, input, output, overtime) in logs {
        tx.execute(
            r#"
            INSERT INTO production_logs (
                worker_id, item_id, section_id, date, target, actual,
                input_material, output_material, wastage, overtime_hours
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                worker,
                item,
                section,
                format_date(date),
                target,
                actual,
                input,
                output,
                input - output,
                overtime
            ],
        )?;
    }

    let attendance = [
        (1, 1, yesterday, true),
        (2, 1, yesterday, true),
        (3, 2, yesterday, true),
        (4, 2, yesterday, false),
        (1, 1, today, true),
        (2, 1, today, true),
    ];
    for (worker, section, date, present) in attendance {
        tx.execute(
            "INSERT INTO attendance (worker_id, section_id, date, present) VALUES (?1, ?2, ?3, ?4)",
            params![worker, section, format_date(date), present],
        )?;
    }

    let downtime = [
        (1, "Cotton Processor #1", now - Duration::hours(3), now - Duration::hours(2), "Belt replacement"),
        (2, "Spinning Machine #3", now - Duration::hours(1), now - Duration::minutes(30), "Routine maintenance"),
    ];
    for (section, machine, start, end, remarks) in downtime {
        tx.execute(
            r#"
            INSERT INTO machine_downtime (section_id, machine_name, start_time, end_time, remarks)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![section, machine, format_datetime(start), format_datetime(end), remarks],
        )?;
    }

    let requisitions = [
        (1, 1, 100, "approved", "Monthly stock replenishment"),
        (2, 2, 50, "pending", "Additional material needed for rush order"),
        (5, 3, 200, "pending", "Running low on thread spools"),
    ];
    for (item, section, quantity, status, remarks) in requisitions {
        tx.execute(
            "INSERT INTO requisitions (item_id, section_id, quantity, status, remarks) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![item, section, quantity, status, remarks],
        )?;
    }

    tx.commit()?;
    Ok(())
}

fn print_quick_counts(conn: &Connection) -> Result<(), Box<dyn Error>> {
    let tables = [
        "sections",
        "workers",
        "items",
        "production_logs",
        "attendance",
        "machine_downtime",
        "requisitions",
    ];

    eprintln!("Row counts:");
    for t in tables {
        let sql = format!("SELECT COUNT(*) FROM {}", t);
        let c: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        eprintln!("  {:<20} {}", t, c);
    }
    Ok(())
}
