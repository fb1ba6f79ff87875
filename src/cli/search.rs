use tabled::Table;

use crate::{
    Result,
    cli::{
        Session,
        table::{AlbumRow, ArtistRow, PlaylistRow, TrackRow},
    },
    models::SearchType,
    warning,
};

pub async fn search(query: &str, types: &[SearchType], limit: Option<u32>) -> Result<()> {
    let session = Session::load().await?;
    let types = if types.is_empty() {
        &[SearchType::Track][..]
    } else {
        types
    };

    let result = session
        .api()
        .search()
        .search(query, types, limit, None, None)
        .await?;

    let mut printed = false;
    if let Some(artists) = result.artists.filter(|p| !p.items.is_empty()) {
        let rows: Vec<ArtistRow> = artists.items.iter().map(ArtistRow::from).collect();
        println!("{}", Table::new(rows));
        printed = true;
    }
    if let Some(albums) = result.albums.filter(|p| !p.items.is_empty()) {
        let rows: Vec<AlbumRow> = albums.items.iter().map(AlbumRow::from).collect();
        println!("{}", Table::new(rows));
        printed = true;
    }
    if let Some(tracks) = result.tracks.filter(|p| !p.items.is_empty()) {
        let rows: Vec<TrackRow> = tracks
            .items
            .iter()
            .enumerate()
            .map(|(i, t)| TrackRow::from_track(i, t))
            .collect();
        println!("{}", Table::new(rows));
        printed = true;
    }
    if let Some(playlists) = result.playlists {
        let rows: Vec<PlaylistRow> = playlists
            .items
            .iter()
            .flatten()
            .map(PlaylistRow::from)
            .collect();
        if !rows.is_empty() {
            println!("{}", Table::new(rows));
            printed = true;
        }
    }

    if !printed {
        warning!("Nothing found for \"{}\"", query);
    }

    session.finish().await
}
