use tabled::Table;

use crate::{
    Result,
    cli::{Session, spinner, table::ArtistRow},
    success,
};

/// Lists every followed artist, optionally filtered by a name fragment.
pub async fn followed(search: Option<String>) -> Result<()> {
    let session = Session::load().await?;
    let api = session.api();

    let pb = spinner("Fetching followed artists...");
    let artists = match api.following().followed_artists(Some(50), None).await {
        Ok(first) => first.all_items(api).await,
        Err(e) => Err(e),
    };
    pb.finish_and_clear();
    let mut artists = artists?;

    success!("Fetched {} artists!", artists.len());

    artists.sort_by_key(|a| a.name.to_lowercase());
    if let Some(term) = search.map(|s| s.to_lowercase()) {
        artists.retain(|a| a.name.to_lowercase().contains(&term));
    }

    let rows: Vec<ArtistRow> = artists.iter().map(ArtistRow::from).collect();
    println!("{}", Table::new(rows));

    session.finish().await
}
