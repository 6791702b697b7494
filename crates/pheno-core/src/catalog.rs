//! Static demo content: identities, songs, stories, posts, reels and
//! Phenoverse rooms.
//!
//! The session treats everything here as read-only fixed sequences and only
//! ever indexes into them by id or position.

use serde::Serialize;

use crate::state::Identity;
use crate::state::IdentityId;
use crate::state::PostId;
use crate::state::StoryId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub cover_url: String,
    pub duration_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Story {
    pub id: StoryId,
    pub author: Identity,
    pub image_url: String,
    pub viewed: bool,
    pub song: Option<Song>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: PostId,
    pub author: Identity,
    pub image_url: String,
    pub caption: String,
    pub likes: u32,
    pub comments: u32,
    pub liked: bool,
    pub kind: MediaKind,
    pub posted: String,
    pub song: Option<Song>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Gift,
    SubscriptionShare,
    CreatorFund,
}

impl TransactionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Gift => "Gift",
            Self::SubscriptionShare => "Subscription Share",
            Self::CreatorFund => "Creator Fund",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub counterparty: String,
    pub amount_cents: u64,
    pub when: String,
}

/// A Phenoverse room. Locked rooms are for premium accounts only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub occupants: u32,
    pub vibe: String,
    pub locked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    /// Template for the demo's own account.
    pub me: Identity,
    pub identities: Vec<Identity>,
    pub songs: Vec<Song>,
    pub stories: Vec<Story>,
    pub posts: Vec<Post>,
    pub reels: Vec<Post>,
    pub transactions: Vec<Transaction>,
    pub rooms: Vec<Room>,
}

impl Catalog {
    pub fn identity(&self, id: &IdentityId) -> Option<&Identity> {
        if &self.me.id == id {
            return Some(&self.me);
        }
        self.identities.iter().find(|identity| &identity.id == id)
    }

    pub fn identity_by_handle(&self, handle: &str) -> Option<&Identity> {
        std::iter::once(&self.me)
            .chain(self.identities.iter())
            .find(|identity| identity.handle.eq_ignore_ascii_case(handle.trim()))
    }

    pub fn story_position(&self, id: &StoryId) -> Option<usize> {
        self.stories.iter().position(|story| &story.id == id)
    }

    pub fn song(&self, id: &str) -> Option<&Song> {
        self.songs.iter().find(|song| song.id == id)
    }

    /// Rooms match by id or, ignoring case, by name.
    pub fn room(&self, key: &str) -> Option<&Room> {
        let key = key.trim();
        self.rooms
            .iter()
            .find(|room| room.id == key || room.name.eq_ignore_ascii_case(key))
    }

    /// Stories derived one per identity, in identity order.
    pub fn stories_for(identities: &[Identity], songs: &[Song]) -> Vec<Story> {
        identities
            .iter()
            .enumerate()
            .map(|(i, author)| Story {
                id: StoryId(format!("story-{i}")),
                author: author.clone(),
                image_url: format!("https://picsum.photos/id/{}/400/800", 100 + i * 2),
                viewed: i > 5,
                song: (i % 2 == 0 && !songs.is_empty()).then(|| songs[i % songs.len()].clone()),
                location: match i {
                    5 => Some("Phuket, Thailand".to_string()),
                    6 => Some("Amsterdam, NL".to_string()),
                    _ => None,
                },
            })
            .collect()
    }

    pub fn demo() -> Self {
        let mut me = Identity::new("me", "terp_king", "https://picsum.photos/id/64/150/150");
        me.creator = true;
        me.balance_cents = 42_069;

        let identities = vec![
            account("1", "green_goddess", 65, (true, true, true)),
            account("2", "dank_daily", 66, (false, false, false)),
            account("3", "sativa_steve", 67, (false, true, false)),
            account("4", "indica_in_da_couch", 68, (false, false, false)),
            account("5", "hybrid_hero", 69, (true, true, true)),
            account("u_thai", "bangkok_buds", 400, (true, false, false)),
            account("u_dam", "amsterdam_classics", 401, (false, false, false)),
            account("u_bc", "bc_growers_assoc", 402, (true, false, false)),
            account("u_jam", "roots_culture_ja", 403, (false, false, false)),
            account("u_bcn", "barcelona_club_social", 404, (false, false, false)),
            account("u_glass", "heady_glass_art", 405, (true, true, true)),
        ];

        let songs = vec![
            song("s1", "High Grade", "The Green Team", 301, 180),
            song("s2", "Purple Haze Dreams", "Hendrix Vibes", 302, 210),
            song("s3", "Sunday Morning", "Chill Hop Beats", 304, 150),
            song("s4", "Pass The Dutchie", "Reggae Legends", 305, 200),
            song("s5", "Siam Soul", "Bangkok Beats", 306, 190),
            song("s6", "Afrobeat Chill", "Global Rhythms", 307, 220),
        ];

        let stories = Self::stories_for(&identities, &songs);

        let posts = vec![
            post(
                "post-1",
                &identities[0],
                111,
                "Fresh harvest looking frosty! ❄️🌿 #organic #homegrow",
                (420, 69, true),
                "2h ago",
                Some(&songs[0]),
                Some("Humboldt County, CA"),
            ),
            post(
                "post-thai",
                &identities[5],
                420,
                "The scene in Bangkok is exploding! 🇹🇭 Visiting the newest dispensaries on Sukhumvit. 🔥 #legalization #thailand",
                (3_402, 156, false),
                "4h ago",
                Some(&songs[4]),
                Some("Bangkok, Thailand"),
            ),
            post(
                "post-2",
                &identities[4],
                212,
                "Sunset sessions with the best terpenes. 🌅💨",
                (1_205, 45, false),
                "5h ago",
                None,
                None,
            ),
            post(
                "post-bcn",
                &identities[9],
                421,
                "Member exclusives dropping this weekend. ✨ #csc #bcn",
                (890, 42, true),
                "6h ago",
                None,
                Some("Barcelona, Spain"),
            ),
            post(
                "post-3",
                &identities[2],
                113,
                "Macro shot of the day. Check out those trichomes! 🔬",
                (89, 12, false),
                "1d ago",
                Some(&songs[2]),
                None,
            ),
            post(
                "post-glass",
                &identities[10],
                423,
                "Fresh out of the kiln. Crushed opal and UV reactive glass. 🌪️💎",
                (12_400, 890, true),
                "2d ago",
                None,
                Some("Denver, CO"),
            ),
        ];

        let reels = vec![
            reel(
                "reel-1",
                &identities[1],
                220,
                "How to roll the perfect joint 101 📜✨ #tutorial",
                (15_200, 420, false),
                "1d ago",
                &songs[1],
            ),
            reel(
                "reel-dam",
                &identities[6],
                425,
                "Cycling across town to the best coffeeshop. 🚲🇳🇱 #travel",
                (22_000, 1_100, true),
                "2d ago",
                &songs[5],
            ),
            reel(
                "reel-2",
                &identities[3],
                221,
                "Vibes in the studio today 🎵💨",
                (3_400, 150, true),
                "2d ago",
                &songs[2],
            ),
        ];

        let transactions = vec![
            transaction(TransactionKind::Gift, "green_goddess", 420, "2h ago"),
            transaction(TransactionKind::SubscriptionShare, "Pheno+", 1_500, "1d ago"),
            transaction(TransactionKind::Gift, "dank_daily", 1_000, "2d ago"),
            transaction(TransactionKind::CreatorFund, "Phenogram", 4_530, "1w ago"),
        ];

        let rooms = vec![
            room("1", "Sativa Sanctuary", 128, "Energetic", false),
            room("2", "Indica Lounge", 420, "Chill", false),
            room("3", "Growers Guild VR", 64, "Educational", true),
            room("4", "NFT Gallery", 12, "Art", true),
        ];

        Self {
            me,
            identities,
            songs,
            stories,
            posts,
            reels,
            transactions,
            rooms,
        }
    }
}

fn account(id: &str, handle: &str, picture: u32, flags: (bool, bool, bool)) -> Identity {
    let (verified, premium, creator) = flags;
    let mut identity = Identity::new(
        id,
        handle,
        format!("https://picsum.photos/id/{picture}/150/150"),
    );
    identity.verified = verified;
    identity.premium = premium;
    identity.creator = creator;
    identity
}

fn song(id: &str, title: &str, artist: &str, cover: u32, duration_secs: u32) -> Song {
    Song {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        cover_url: format!("https://picsum.photos/id/{cover}/100/100"),
        duration_secs,
    }
}

#[allow(clippy::too_many_arguments)]
fn post(
    id: &str,
    author: &Identity,
    picture: u32,
    caption: &str,
    stats: (u32, u32, bool),
    posted: &str,
    song: Option<&Song>,
    location: Option<&str>,
) -> Post {
    let (likes, comments, liked) = stats;
    Post {
        id: PostId(id.to_string()),
        author: author.clone(),
        image_url: format!("https://picsum.photos/id/{picture}/600/600"),
        caption: caption.to_string(),
        likes,
        comments,
        liked,
        kind: MediaKind::Image,
        posted: posted.to_string(),
        song: song.cloned(),
        location: location.map(str::to_string),
    }
}

fn reel(
    id: &str,
    author: &Identity,
    picture: u32,
    caption: &str,
    stats: (u32, u32, bool),
    posted: &str,
    song: &Song,
) -> Post {
    let mut reel = post(id, author, picture, caption, stats, posted, Some(song), None);
    reel.image_url = format!("https://picsum.photos/id/{picture}/400/800");
    reel.kind = MediaKind::Video;
    reel
}

fn room(id: &str, name: &str, occupants: u32, vibe: &str, locked: bool) -> Room {
    Room {
        id: id.to_string(),
        name: name.to_string(),
        occupants,
        vibe: vibe.to_string(),
        locked,
    }
}

fn transaction(kind: TransactionKind, counterparty: &str, amount_cents: u64, when: &str) -> Transaction {
    Transaction {
        kind,
        counterparty: counterparty.to_string(),
        amount_cents,
        when: when.to_string(),
    }
}
