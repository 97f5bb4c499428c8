use axum::{
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use notebook_client::{ApiClient, Notebook};
use notebook_core::{Error, NoteData, NoteFilter, NotebookService};
use notebook_server::create_router;
use notebook_sqlite::SqliteDatabase;
use serde_json::json;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn connect() -> Notebook {
    let db = SqliteDatabase::open_in_memory().unwrap();
    let base = serve(create_router(NotebookService::new(db))).await;
    Notebook::connect(ApiClient::new(&base).unwrap()).await.unwrap()
}

fn data(title: &str, pinned: bool, tags: Vec<notebook_core::Tag>) -> NoteData {
    NoteData {
        title: title.into(),
        markdown: format!("# {}", title),
        pinned,
        tags,
    }
}

#[tokio::test]
async fn test_create_note_refetches_and_joins_tags() {
    let mut notebook = connect().await;
    let work = notebook.add_tag("work").await.unwrap();

    let id = notebook
        .create_note(data("Plan", false, vec![work.clone()]))
        .await
        .unwrap();

    let note = notebook.note(&id).unwrap();
    assert_eq!(note.title, "Plan");
    assert_eq!(note.markdown, "# Plan");
    assert!(!note.pinned);
    assert_eq!(note.tags, vec![work]);
}

#[tokio::test]
async fn test_update_note_replaces_everything() {
    let mut notebook = connect().await;
    let a = notebook.add_tag("a").await.unwrap();
    let b = notebook.add_tag("b").await.unwrap();

    let id = notebook
        .create_note(data("Old", false, vec![a]))
        .await
        .unwrap();
    notebook
        .update_note(&id, data("New", true, vec![b.clone()]))
        .await
        .unwrap();

    let note = notebook.note(&id).unwrap();
    assert_eq!(note.title, "New");
    assert!(note.pinned);
    assert_eq!(note.tags, vec![b]);
}

#[tokio::test]
async fn test_toggle_pin_moves_note_first() {
    let mut notebook = connect().await;
    let first = notebook
        .create_note(data("First", false, vec![]))
        .await
        .unwrap();
    let second = notebook
        .create_note(data("Second", false, vec![]))
        .await
        .unwrap();

    assert!(notebook.toggle_pin(&second).await.unwrap());

    let ids: Vec<_> = notebook
        .visible_notes(&NoteFilter::default())
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(ids, vec![second.clone(), first]);

    assert!(!notebook.toggle_pin(&second).await.unwrap());
    assert!(matches!(
        notebook.toggle_pin("missing").await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_tag_prunes_cached_notes() {
    let mut notebook = connect().await;
    let a = notebook.add_tag("a").await.unwrap();
    let b = notebook.add_tag("b").await.unwrap();
    let id = notebook
        .create_note(data("Note", false, vec![a.clone(), b.clone()]))
        .await
        .unwrap();

    notebook.delete_tag(&a.id).await.unwrap();

    assert_eq!(notebook.notes()[0].tag_ids, vec![b.id.clone()]);
    assert_eq!(notebook.tags(), &[b.clone()][..]);

    // The server agrees after a full reload
    notebook.refresh().await.unwrap();
    assert_eq!(notebook.note(&id).unwrap().tags, vec![b]);
}

#[tokio::test]
async fn test_update_tag_and_delete_note() {
    let mut notebook = connect().await;
    let tag = notebook.add_tag("draft").await.unwrap();
    let id = notebook
        .create_note(data("Note", false, vec![tag.clone()]))
        .await
        .unwrap();

    notebook.update_tag(&tag.id, "final").await.unwrap();
    assert_eq!(notebook.note(&id).unwrap().tags[0].label, "final");

    notebook.delete_note(&id).await.unwrap();
    assert!(notebook.notes().is_empty());

    notebook.refresh().await.unwrap();
    assert!(notebook.notes().is_empty());
    assert_eq!(notebook.tags()[0].label, "final");
}

#[tokio::test]
async fn test_filtering_through_the_cache() {
    let mut notebook = connect().await;
    let a = notebook.add_tag("A").await.unwrap();
    let b = notebook.add_tag("B").await.unwrap();

    let grocery = notebook
        .create_note(data("Grocery", false, vec![a.clone()]))
        .await
        .unwrap();
    notebook
        .create_note(data("Groceries", false, vec![b.clone()]))
        .await
        .unwrap();
    notebook
        .create_note(data("Work", false, vec![a.clone(), b]))
        .await
        .unwrap();

    let filter = NoteFilter {
        title: "Groc".into(),
        tag_ids: vec![a.id],
    };
    let ids: Vec<_> = notebook
        .visible_notes(&filter)
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(ids, vec![grocery]);
}

#[tokio::test]
async fn test_failed_delete_leaves_cache_untouched() {
    let router = Router::new()
        .route(
            "/notes",
            get(|| async {
                Json(json!([
                    {"id": "n1", "title": "T", "markdown": "M", "pinned": false, "tagIds": ["t1"]}
                ]))
            }),
        )
        .route(
            "/tags",
            get(|| async { Json(json!([{"id": "t1", "label": "work"}])) }),
        )
        .route(
            "/tags/:id",
            delete(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "disk I/O error"})),
                )
            }),
        );
    let base = serve(router).await;
    let mut notebook = Notebook::connect(ApiClient::new(&base).unwrap())
        .await
        .unwrap();

    let err = notebook.delete_tag("t1").await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "disk I/O error");
        }
        other => panic!("unexpected error: {}", other),
    }

    assert_eq!(notebook.tags().len(), 1);
    assert_eq!(notebook.notes()[0].tag_ids, vec!["t1"]);
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = ApiClient::new(&format!("http://{}", addr)).unwrap();
    let err = Notebook::connect(api).await.err().unwrap();
    assert!(matches!(err, Error::Network(_)));
}
