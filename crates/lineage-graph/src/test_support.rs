//! Small seed type and graph fixtures for unit tests.

use lineage_core::Seed;

use crate::graph::Graph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSeed {
    pub id: String,
    pub parents: Vec<String>,
}

impl Seed for TestSeed {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }

    fn parents(&self) -> &[String] {
        &self.parents
    }
}

pub fn key(id: &str) -> String {
    id.to_string()
}

pub fn seed(id: &str, parents: &[&str]) -> TestSeed {
    TestSeed {
        id: key(id),
        parents: parents.iter().map(|p| key(p)).collect(),
    }
}

/// `n0 <- n1 <- ... <- n{len-1}`.
pub fn chain(len: usize) -> Graph<TestSeed> {
    let seeds = (0..len).map(|i| {
        let id = format!("n{i}");
        match i.checked_sub(1) {
            Some(prev) => {
                let prev = format!("n{prev}");
                seed(&id, &[prev.as_str()])
            }
            None => seed(&id, &[]),
        }
    });
    Graph::build(seeds, false).expect("chain builds")
}

/// Two roots `r1`, `r2` with private children `a1`, `a2` and a shared merge
/// `m` of `a1` and `a2`, plus an isolated root `solo`.
pub fn two_roots() -> Graph<TestSeed> {
    Graph::build(
        vec![
            seed("r1", &[]),
            seed("r2", &[]),
            seed("a1", &["r1"]),
            seed("a2", &["r2"]),
            seed("m", &["a1", "a2"]),
            seed("solo", &[]),
        ],
        false,
    )
    .expect("fixture builds")
}
