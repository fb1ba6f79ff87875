use tabled::Table;

use crate::{
    Result,
    cli::{
        Session,
        table::{TrackRow, artist_names},
    },
    info,
};

pub async fn album(id: &str) -> Result<()> {
    let session = Session::load().await?;
    let api = session.api();

    let album = api.albums().album(id, None).await?;
    let first_page = album.tracks.clone();
    let tracks = first_page.all_items(api).await?;

    info!(
        "{} by {} ({})",
        album.name,
        artist_names(&album.artists),
        album.release_date.as_deref().unwrap_or("unknown date")
    );
    if let Some(label) = &album.label {
        info!("Label: {}", label);
    }

    let rows: Vec<TrackRow> = tracks.iter().map(TrackRow::from_simple).collect();
    println!("{}", Table::new(rows));

    session.finish().await
}
