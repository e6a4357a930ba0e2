mod common;

use common::{FixtureServer, zip_bytes};
use recdata::readers::npy::encode_npy_f32;
use recdata::{
    AuxiliaryDataSource, CacheConfig, ContentCache, Dataset, DatasetError, DatasetRegistry,
    RegistryConfig,
};
use tempfile::tempdir;

fn amazon_clothing_server() -> FixtureServer {
    let npy = encode_npy_f32(2, 3, &[0.1, 0.2, 0.3, 1.0, 2.0, 3.0]);
    FixtureServer::spawn(
        vec![
            (
                "/amazon_clothing/rating.zip",
                zip_bytes(&[("rating.txt", b"u1\tB01\t5\nu2\tB02\t3\n".as_slice())]),
            ),
            (
                "/amazon_clothing/text.zip",
                zip_bytes(&[("text.txt", b"red shirt::B01\nblue jeans::B02\n".as_slice())]),
            ),
            (
                "/amazon_clothing/image_features.zip",
                zip_bytes(&[("image_features.npy", npy.as_slice())]),
            ),
            (
                "/amazon_clothing/item_ids.zip",
                zip_bytes(&[("item_ids.txt", b"B01\nB02\n".as_slice())]),
            ),
            (
                "/amazon_clothing/context.zip",
                zip_bytes(&[("context.txt", b"B01\tB02\n".as_slice())]),
            ),
        ],
        5,
    )
}

#[test]
fn amazon_clothing_loads_every_modality_once() {
    let server = amazon_clothing_server();
    let temp = tempdir().unwrap();
    let registry = DatasetRegistry::new(
        ContentCache::new(CacheConfig::new(temp.path())),
        RegistryConfig::new(format!("{}/", server.base_url)),
    );
    let facade = registry.get("amazon_clothing").unwrap();

    for _ in 0..2 {
        let feedback = facade.load_feedback().unwrap();
        assert_eq!(feedback.len(), 2);
        assert_eq!(feedback.records[1].item, "B02");
        assert_eq!(feedback.records[1].rating, 3.0);

        let corpus = facade.load_text().unwrap();
        assert_eq!(corpus.ids, vec!["B01", "B02"]);
        assert_eq!(corpus.documents[0], "red shirt");

        let visual = facade.load_visual_feature().unwrap();
        assert_eq!(visual.ids, vec!["B01", "B02"]);
        assert_eq!(visual.feature_for("B02"), Some(&[1.0f32, 2.0, 3.0][..]));

        let graph = facade.load_graph().unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.records[0].source, "B01");
    }

    assert_eq!(server.request_count(), 5);
    assert!(temp.path().join("amazon_clothing/rating.txt").is_file());
}

#[test]
fn tradesy_has_no_text_or_graph() {
    let temp = tempdir().unwrap();
    let registry = DatasetRegistry::new(
        ContentCache::new(CacheConfig::new(temp.path())),
        RegistryConfig::new("http://127.0.0.1:9"),
    );
    let facade = registry.facade(Dataset::Tradesy);

    let err = facade.load_text().unwrap_err();
    assert!(
        matches!(err, DatasetError::ModalityUnavailable { modality: "text", .. }),
        "got {err:?}"
    );
    let err = facade.load_graph().unwrap_err();
    assert!(
        matches!(err, DatasetError::ModalityUnavailable { modality: "graph", .. }),
        "got {err:?}"
    );
    assert!(facade.manifest().visual.is_some());
}

#[test]
fn unknown_dataset_name_is_rejected() {
    let temp = tempdir().unwrap();
    let registry = DatasetRegistry::new(
        ContentCache::new(CacheConfig::new(temp.path())),
        RegistryConfig::default(),
    );
    let err = registry.get("movielens").unwrap_err();
    assert!(matches!(err, DatasetError::UnknownDataset(name) if name == "movielens"));
}
