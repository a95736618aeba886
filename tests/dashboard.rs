use std::fs;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use funolympics_dashboard::chart::Trace;
use funolympics_dashboard::server::{Server, READ_TIMEOUT};
use funolympics_dashboard::{Column, Dashboard, Dataset, LoadError, Selection};
use serde_json::Value;
use tempfile::TempDir;

const HEADER: &str = "sports,country,views,continent,age,gender,occupation,time";

fn write_csv(path: &Path, header: &str, rows: &[&str]) {
    let mut out = String::new();
    out.push_str(header);
    out.push('\n');
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    fs::write(path, out).unwrap();
}

fn sample(dir: &TempDir) -> Dataset {
    let path = dir.path().join("FunOlympic.csv");
    write_csv(
        &path,
        HEADER,
        &[
            "athletics,USA,10,NA,25,male,student,morning",
            "athletics,USA,5,NA,30,female,engineer,evening",
            "swimming,UK,8,EU,22,female,student,morning",
            "swimming,USA,7,NA,25,male,teacher,morning",
            "athletics,UK,4,EU,41,male,teacher,night",
        ],
    );
    Dataset::load(&path).unwrap()
}

#[test]
fn loads_file_and_discovers_vocabulary() {
    let dir = TempDir::new().unwrap();
    let dataset = sample(&dir);
    assert_eq!(dataset.len(), 5);
    assert_eq!(
        dataset.distinct_values(Column::Sports).iter().collect::<Vec<_>>(),
        vec!["athletics", "swimming"]
    );
    assert_eq!(
        dataset.distinct_values(Column::Time).iter().collect::<Vec<_>>(),
        vec!["morning", "evening", "night"]
    );
}

#[test]
fn missing_column_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    write_csv(
        &path,
        "sports,country,views,continent,age,gender,occupation",
        &["athletics,USA,10,NA,25,male,student"],
    );
    match Dataset::load(&path) {
        Err(LoadError::MissingColumns(missing)) => assert_eq!(missing, vec!["time".to_string()]),
        other => panic!("unexpected result: {:?}", other.map(|d| d.len())),
    }
}

#[test]
fn missing_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = Dataset::load(dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn heatmap_sums_per_time_bucket() {
    let dir = TempDir::new().unwrap();
    let dashboard = Dashboard::new(sample(&dir));
    let figure = dashboard.render(&Selection::Heatmap {
        country: "USA".to_string(),
        sport: "athletics".to_string(),
    });
    match &figure.data[0] {
        Trace::Heatmap { x, y, z, colorscale } => {
            assert_eq!(x, &vec!["evening".to_string(), "morning".to_string()]);
            assert_eq!(y, &vec!["USA".to_string()]);
            assert_eq!(z, &vec![vec![5.0, 10.0]]);
            assert_eq!(colorscale, "Viridis");
        }
        other => panic!("unexpected trace: {:?}", other),
    }
}

#[test]
fn histogram_groups_by_gender() {
    let dir = TempDir::new().unwrap();
    let dashboard = Dashboard::new(sample(&dir));
    let figure = dashboard.render(&Selection::Histogram { country: "USA".to_string() });
    let names = figure
        .data
        .iter()
        .map(|t| match t {
            Trace::Bar { name, .. } => name.clone().unwrap_or_default(),
            other => panic!("unexpected trace: {:?}", other),
        })
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["male".to_string(), "female".to_string()]);
    assert_eq!(figure.total(), 22.0);
}

fn get(addr: &str, target: &str) -> (String, Value) {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
    write!(stream, "GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", target).unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    let (head, body) = response.split_once("\r\n\r\n").unwrap();
    let status = head.lines().next().unwrap().to_string();
    let json = serde_json::from_str(body).unwrap_or(Value::Null);
    (status, json)
}

#[test]
fn serves_figures_over_http() {
    let dir = TempDir::new().unwrap();
    let server = Server::new(Dashboard::new(sample(&dir)));
    let listener = Server::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    thread::spawn(move || server.run(listener));

    let (status, health) = get(&addr, "/api/health");
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(health["dataset"]["rows"], 5);

    let (_, figure) = get(&addr, "/api/figure/line?sport=swimming");
    let traces = figure["data"].as_array().unwrap();
    assert_eq!(traces.len(), 2);
    assert_eq!(traces[0]["name"], "EU");
    assert_eq!(traces[1]["name"], "NA");

    let (_, figure) = get(&addr, "/api/figure/scatter?country=Atlantis");
    assert_eq!(figure["data"].as_array().unwrap().len(), 0);

    let (status, _) = get(&addr, "/api/figure/pie");
    assert_eq!(status, "HTTP/1.1 404 Not Found");
}

#[test]
fn idle_client_does_not_block_others() {
    let dir = TempDir::new().unwrap();
    let server = Server::new(Dashboard::new(sample(&dir)));
    let listener = Server::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    thread::spawn(move || server.run(listener));

    // connects first and never sends a byte
    let _idle = TcpStream::connect(&addr).unwrap();
    let started = Instant::now();
    let (status, health) = get(&addr, "/api/health");
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert_eq!(health["status"], "ok");
    assert!(started.elapsed() < READ_TIMEOUT + Duration::from_secs(5));
}

#[test]
fn bundled_sample_loads() {
    let dataset = Dataset::load(funolympics_dashboard::config::DEFAULT_DATA_PATH).unwrap();
    assert!(!dataset.is_empty());
    let dashboard = Dashboard::new(dataset);
    for view in funolympics_dashboard::View::all() {
        let selection = dashboard.default_selection(*view);
        let figure = dashboard.render(&selection);
        assert!(figure.title().is_some(), "{} has no title", view);
    }
}
