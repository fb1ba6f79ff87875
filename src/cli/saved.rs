use tabled::Table;

use crate::{
    Result,
    cli::{Session, spinner, table::SavedTrackRow},
    info,
};

/// Prints saved tracks, newest first. Without `limit` every page is fetched.
pub async fn saved(limit: Option<u32>) -> Result<()> {
    let session = Session::load().await?;
    let api = session.api();

    let pb = spinner("Fetching saved tracks...");
    let fetched = match limit {
        Some(limit) => api
            .library()
            .saved_tracks(Some(limit.clamp(1, 50)), None, None)
            .await
            .map(|page| (page.total, page.items)),
        None => match api.library().saved_tracks(Some(50), None, None).await {
            Ok(first) => {
                let total = first.total;
                first.all_items(api).await.map(|items| (total, items))
            }
            Err(e) => Err(e),
        },
    };
    pb.finish_and_clear();
    let (total, tracks) = fetched?;

    let rows: Vec<SavedTrackRow> = tracks.iter().map(SavedTrackRow::from).collect();
    println!("{}", Table::new(rows));
    info!("Showing {} of {} saved tracks", tracks.len(), total);

    session.finish().await
}
