use super::*;

use crate::engine::{BotConfig, run_turn};
use crate::model::{Attachment, EntryId, UserId};
use crate::store::{Db, EntryStore, ShareStore, UserDirectory};
use crate::transport::{Outbox, Reply};

const ANN: UserId = 1;
const BOB: UserId = 2;

struct Bench {
    db: Db,
    outbox: Outbox,
    config: BotConfig,
}

impl Bench {
    fn new() -> Self {
        Self {
            db: Db::new(),
            outbox: Outbox::new(),
            config: BotConfig::default(),
        }
    }

    fn turn(&mut self, user: UserId, cmd: Command) -> Session {
        let mut ctx = Ctx {
            store: &mut self.db,
            transport: &mut self.outbox,
            config: &self.config,
        };
        let from = PartialUser {
            id: user,
            name: format!("user{}", user),
            lang: None,
        };
        run_turn(&mut ctx, &from, &cmd).expect("run turn")
    }

    fn reply(&mut self) -> Reply {
        let mut replies = self.outbox.take();
        assert_eq!(replies.len(), 1, "exactly one reply per turn");
        replies.remove(0)
    }

    fn root(&mut self, user: UserId) -> EntryId {
        self.db.create_root(user).expect("root").id
    }

    fn create(&mut self, new: NewEntry) -> Entry {
        self.db.create(new).expect("create")
    }

    fn entry(&self, id: &EntryId) -> Option<Entry> {
        self.db.get(id).expect("get")
    }

    /// Puts a user's session on `id` as if they had navigated there.
    fn place(&mut self, user: UserId, id: &EntryId) {
        let mut session = self.turn(user, Command::new(CommandKind::ResetToRoot));
        self.outbox.take();
        session.navigate(id);
        self.db.save_session(&session).expect("save session");
    }

    fn share(&mut self, entry: &Entry, target: UserId) {
        self.db
            .create_share(NewShare {
                entry_id: entry.id.clone(),
                owner: entry.owner,
                shared_to: target,
                name: format!("user{}", target),
                from_name: "user1".to_string(),
                lang: None,
            })
            .expect("share");
    }
}

fn dialog_text(reply: Reply) -> (String, Format, bool) {
    match reply {
        Reply::Dialog {
            text,
            format,
            force_reply,
            ..
        } => (text, format, force_reply),
        other => panic!("expected dialog, got {:?}", other),
    }
}

#[test]
fn out_of_range_selection_falls_back_to_root() {
    let mut b = Bench::new();
    let root = b.root(ANN);
    let docs = b.create(NewEntry::dir("Docs", &root, ANN));

    let s = b.turn(ANN, Command::select(CommandKind::OpenDir, 0));
    assert_eq!(s.subject_id, docs.id);
    b.reply();

    let s = b.turn(ANN, Command::select(CommandKind::OpenDir, 7));
    assert_eq!(s.subject_id, root);
    assert_eq!(s.mode, Mode::Browsing);
    assert!(matches!(b.reply(), Reply::Content { .. }));
}

#[test]
fn mkdir_prompts_then_creates_and_enters() {
    let mut b = Bench::new();

    let s = b.turn(ANN, Command::new(CommandKind::MkDir));
    assert_eq!(s.input_wait, InputWait::Dir);
    let (text, format, force_reply) = dialog_text(b.reply());
    assert_eq!(text, texts::type_folder());
    assert_eq!(format, Format::Plain);
    assert!(force_reply);

    let s = b.turn(ANN, Command::with_input(CommandKind::MkDir, "Work"));
    assert_eq!(s.input_wait, InputWait::None);
    let work = b.entry(&s.subject_id).expect("created");
    assert_eq!(work.name, "Work");
    assert_eq!(work.path, "/Work");
    assert!(matches!(b.reply(), Reply::Content { .. }));
}

#[test]
fn mkdir_with_a_taken_name_changes_nothing() {
    let mut b = Bench::new();
    let root = b.root(ANN);
    b.create(NewEntry::dir("Docs", &root, ANN));

    let s = b.turn(ANN, Command::with_input(CommandKind::MkDir, "Docs"));
    assert_eq!(s.subject_id, root);
    assert_eq!(b.db.list(&root).expect("list").len(), 1);
    b.reply();
}

#[test]
fn any_command_abandons_a_pending_prompt() {
    let mut b = Bench::new();
    b.turn(ANN, Command::new(CommandKind::MkLabel));
    b.reply();

    let s = b.turn(ANN, Command::new(CommandKind::Gear));
    assert_eq!(s.input_wait, InputWait::None);
    assert!(s.is_gearing());
    b.reply();
}

#[test]
fn open_label_resolves_against_the_gearing_scope() {
    let mut b = Bench::new();
    let root = b.root(ANN);
    b.create(NewEntry::dir("A", &root, ANN));
    b.create(NewEntry::label("zeta", &root, ANN));
    b.create(NewEntry::label("alpha", &root, ANN));

    b.turn(ANN, Command::new(CommandKind::Gear));
    b.reply();

    // Gearing scope is [alpha, zeta]; the browsing scope would be [A, alpha, zeta].
    let s = b.turn(ANN, Command::select(CommandKind::OpenLabel, 1));
    let label = b.entry(&s.subject_id).expect("label");
    assert_eq!(label.name, "zeta");
    assert_eq!(s.mode, Mode::Browsing);
    b.reply();
}

#[test]
fn rename_dir_moves_children_and_rejects_slashes() {
    let mut b = Bench::new();
    let root = b.root(ANN);
    let docs = b.create(NewEntry::dir("Docs", &root, ANN));
    let file = b.create(NewEntry::file("x.txt", "ref", &docs.id, ANN));
    b.place(ANN, &docs.id);

    let s = b.turn(ANN, Command::new(CommandKind::RenameDir));
    assert_eq!(s.input_wait, InputWait::RenameDir);
    b.reply();

    b.turn(ANN, Command::with_input(CommandKind::RenameDir, "Papers"));
    b.reply();
    assert_eq!(b.entry(&file.id).expect("file").path, "/Papers/x.txt");

    b.turn(ANN, Command::with_input(CommandKind::RenameDir, "a/b"));
    b.reply();
    assert_eq!(b.entry(&docs.id).expect("dir").name, "Papers");
}

#[test]
fn uploads_never_overwrite_a_sibling() {
    let mut b = Bench::new();
    let root = b.root(ANN);
    let upload = |r: &str| {
        Command::with_file(
            CommandKind::UploadFile,
            Attachment {
                owner: ANN,
                name: "a.txt".to_string(),
                file_ref: Some(r.to_string()),
            },
        )
    };

    b.turn(ANN, upload("r1"));
    b.reply();
    b.turn(ANN, upload("r2"));
    b.reply();

    let mut names: Vec<String> = b
        .db
        .list(&root)
        .expect("list")
        .into_iter()
        .map(|e| e.name)
        .collect();
    names.sort();
    assert_eq!(names, ["a (1).txt", "a.txt"]);
}

#[test]
fn upload_from_a_file_lands_in_its_directory() {
    let mut b = Bench::new();
    let root = b.root(ANN);
    let docs = b.create(NewEntry::dir("Docs", &root, ANN));
    let file = b.create(NewEntry::file("x.txt", "ref", &docs.id, ANN));
    b.place(ANN, &file.id);

    let s = b.turn(
        ANN,
        Command::with_file(
            CommandKind::UploadFile,
            Attachment {
                owner: ANN,
                name: "y.txt".to_string(),
                file_ref: Some("r".to_string()),
            },
        ),
    );
    assert_eq!(s.subject_id, docs.id);
    assert_eq!(b.db.list(&docs.id).expect("list").len(), 2);
    b.reply();
}

#[test]
fn grantee_can_browse_but_not_remove_the_mount() {
    let mut b = Bench::new();
    let ann_root = b.root(ANN);
    let docs = b.create(NewEntry::dir("Docs", &ann_root, ANN));
    b.share(&docs, BOB);
    b.place(BOB, &docs.id);

    let s = b.turn(BOB, Command::new(CommandKind::DropDir));
    assert!(b.entry(&docs.id).is_some());
    assert_eq!(s.subject_id, docs.id);
    b.reply();

    // Above the mount there is only Bob's own root.
    let s = b.turn(BOB, Command::new(CommandKind::OpenParent));
    assert_eq!(s.subject_id, s.root_id);
    assert_ne!(s.root_id, ann_root);
    b.reply();
}

#[test]
fn read_only_grantee_cannot_create_until_upgraded() {
    let mut b = Bench::new();
    let ann_root = b.root(ANN);
    let docs = b.create(NewEntry::dir("Docs", &ann_root, ANN));
    b.share(&docs, BOB);
    b.place(BOB, &docs.id);

    b.turn(BOB, Command::with_input(CommandKind::MkLabel, "hello"));
    b.reply();
    assert!(b.db.list(&docs.id).expect("list").is_empty());

    let share = b.db.list_for_entry(&docs.id).expect("list").remove(0);
    b.db.change_read_write(&share.id).expect("flip");

    b.place(BOB, &docs.id);
    b.turn(BOB, Command::with_input(CommandKind::MkLabel, "hello"));
    b.reply();
    assert_eq!(b.db.list(&docs.id).expect("list").len(), 1);
}

#[test]
fn non_owner_cannot_open_the_share_panel() {
    let mut b = Bench::new();
    let ann_root = b.root(ANN);
    let docs = b.create(NewEntry::dir("Docs", &ann_root, ANN));
    b.share(&docs, BOB);
    b.place(BOB, &docs.id);

    let s = b.turn(BOB, Command::new(CommandKind::Share));
    assert!(!s.is_sharing());
    b.reply();
}

#[test]
fn joining_a_link_mounts_the_entry() {
    let mut b = Bench::new();
    let ann_root = b.root(ANN);
    let docs = b.create(NewEntry::dir("Docs", &ann_root, ANN));
    b.place(ANN, &docs.id);
    b.turn(ANN, Command::new(CommandKind::MakeGlobLink));
    b.reply();
    let link = b
        .db
        .list_for_entry(&docs.id)
        .expect("list")
        .into_iter()
        .find(|s| s.is_global())
        .expect("global share");

    // The owner following their own link just lands on their root.
    let s = b.turn(ANN, Command::with_input(CommandKind::JoinPublicShare, link.id.as_str()));
    assert_eq!(s.subject_id, ann_root);
    b.reply();

    let s = b.turn(BOB, Command::with_input(CommandKind::JoinPublicShare, link.id.as_str()));
    assert_eq!(s.subject_id, docs.id);
    assert!(b.db.exists_for(&docs.id, BOB).expect("exists"));
    b.reply();

    // Joining twice keeps a single grant.
    b.turn(BOB, Command::with_input(CommandKind::JoinPublicShare, link.id.as_str()));
    b.reply();
    assert_eq!(b.db.list_for_entry(&docs.id).expect("list").len(), 2);
}

#[test]
fn unknown_link_falls_back_to_root() {
    let mut b = Bench::new();
    let s = b.turn(BOB, Command::with_input(CommandKind::JoinPublicShare, "nope"));
    assert_eq!(s.subject_id, s.root_id);
    b.reply();
}

#[test]
fn grant_access_creates_a_personal_share() {
    let mut b = Bench::new();
    let ann_root = b.root(ANN);
    let docs = b.create(NewEntry::dir("Docs", &ann_root, ANN));
    b.place(ANN, &docs.id);

    let s = b.turn(ANN, Command::new(CommandKind::MkGrant));
    assert_eq!(s.input_wait, InputWait::FileGrant);
    b.reply();

    let contact = Attachment {
        owner: BOB,
        name: "Bob".to_string(),
        file_ref: None,
    };
    let s = b.turn(
        ANN,
        Command::with_file(CommandKind::GrantAccess, contact.clone()),
    );
    assert!(s.is_sharing());
    b.reply();

    let shares = b.db.list_for_entry(&docs.id).expect("list");
    assert_eq!(shares.len(), 1);
    assert_eq!(shares[0].shared_to, BOB);
    assert_eq!(shares[0].name, "Bob");
    assert_eq!(shares[0].lang.as_deref(), Some("en"));
    assert!(b.entry(&docs.id).expect("docs").shared);

    // Granting to yourself is ignored.
    b.turn(
        ANN,
        Command::with_file(
            CommandKind::GrantAccess,
            Attachment {
                owner: ANN,
                ..contact
            },
        ),
    );
    b.reply();
    assert_eq!(b.db.list_for_entry(&docs.id).expect("list").len(), 1);
}

#[test]
fn search_from_a_file_starts_at_root() {
    let mut b = Bench::new();
    let root = b.root(ANN);
    let docs = b.create(NewEntry::dir("Docs", &root, ANN));
    let file = b.create(NewEntry::file("x.txt", "ref", &docs.id, ANN));
    b.place(ANN, &file.id);

    let s = b.turn(ANN, Command::with_input(CommandKind::DoSearch, "x"));
    assert!(s.is_searching());
    assert_eq!(s.search_dir_id, Some(root.clone()));
    assert_eq!(s.subject_id, root);
    b.reply();
}

#[test]
fn open_searched_keeps_searching_and_back_returns() {
    let mut b = Bench::new();
    let root = b.root(ANN);
    let docs = b.create(NewEntry::dir("Docs", &root, ANN));
    let file = b.create(NewEntry::file("report.txt", "ref", &docs.id, ANN));

    b.turn(ANN, Command::with_input(CommandKind::DoSearch, "report"));
    b.reply();

    let s = b.turn(ANN, Command::select(CommandKind::OpenSearchedFile, 0));
    assert_eq!(s.subject_id, file.id);
    assert!(s.is_searching());
    b.reply();

    let s = b.turn(ANN, Command::new(CommandKind::BackToSearch));
    assert_eq!(s.subject_id, root);
    assert!(s.is_searching());
    b.reply();

    let s = b.turn(ANN, Command::new(CommandKind::CancelSearch));
    assert_eq!(s.mode, Mode::Browsing);
    b.reply();
}

#[test]
fn deleted_subject_sends_the_user_home() {
    let mut b = Bench::new();
    let root = b.root(ANN);
    let docs = b.create(NewEntry::dir("Docs", &root, ANN));
    b.place(ANN, &docs.id);
    b.db.delete(&docs).expect("delete");

    let s = b.turn(ANN, Command::new(CommandKind::Gear));
    assert_eq!(s.subject_id, root);
    assert!(s.is_gearing());
    b.reply();
}

#[test]
fn context_help_answers_with_a_plain_dialog() {
    let mut b = Bench::new();
    let s = b.turn(ANN, Command::new(CommandKind::ContextHelp));
    let (text, format, force_reply) = dialog_text(b.reply());
    assert_eq!(text, texts::help(texts::HelpTopic::Root));
    assert_eq!(format, Format::Plain);
    assert!(!force_reply);
    assert_eq!(s.mode, Mode::Browsing);
}

#[test]
fn drop_returns_to_the_parent_listing() {
    let mut b = Bench::new();
    let root = b.root(ANN);
    let docs = b.create(NewEntry::dir("Docs", &root, ANN));
    let file = b.create(NewEntry::file("x.txt", "ref", &docs.id, ANN));
    b.place(ANN, &file.id);

    let s = b.turn(ANN, Command::new(CommandKind::DropFile));
    assert_eq!(s.subject_id, docs.id);
    assert_eq!(s.view_offset, 0);
    assert!(b.entry(&file.id).is_none());
    b.reply();

    // The root itself is never removed.
    b.place(ANN, &root);
    b.turn(ANN, Command::new(CommandKind::DropDir));
    b.reply();
    assert!(b.entry(&root).is_some());
}

#[test]
fn back_to_search_after_revocation_goes_home() {
    let mut b = Bench::new();
    let ann_root = b.root(ANN);
    let docs = b.create(NewEntry::dir("Docs", &ann_root, ANN));
    let secret = b.create(NewEntry::file("secret-plan.txt", "ref", &docs.id, ANN));
    b.share(&docs, BOB);
    b.place(BOB, &docs.id);

    b.turn(BOB, Command::with_input(CommandKind::DoSearch, "secret"));
    b.reply();
    let s = b.turn(BOB, Command::select(CommandKind::OpenSearchedFile, 0));
    assert_eq!(s.subject_id, secret.id);
    b.reply();

    for share in b.db.list_for_entry(&docs.id).expect("list") {
        b.db.delete_share(&share.id).expect("revoke");
    }

    let s = b.turn(BOB, Command::new(CommandKind::BackToSearch));
    assert_eq!(s.subject_id, s.root_id);
    assert_ne!(s.root_id, ann_root);
    assert!(!s.is_searching());
    let Reply::Content { keyboard, body, .. } = b.reply() else {
        panic!("expected content");
    };
    assert!(keyboard.actions().all(|a| !a.label.contains("secret-plan")));
    assert!(!body.contains("Docs"));
}

/// Ann's share panel for Docs, scope `[Docs(link), user2, user3]`.
fn panel_with_link_first(b: &mut Bench) -> Entry {
    let root = b.root(ANN);
    let docs = b.create(NewEntry::dir("Docs", &root, ANN));
    b.db
        .create_share(NewShare {
            entry_id: docs.id.clone(),
            owner: ANN,
            shared_to: GLOBAL_SHARE_TARGET,
            name: "Docs".to_string(),
            from_name: "user1".to_string(),
            lang: None,
        })
        .expect("link");
    b.share(&docs, BOB);
    b.share(&docs, 3);
    b.place(ANN, &docs.id);
    let s = b.turn(ANN, Command::new(CommandKind::Share));
    assert!(s.is_sharing());
    b.reply();
    docs
}

fn read_write_of(b: &Bench, docs: &Entry, target: UserId) -> bool {
    b.db
        .list_for_entry(&docs.id)
        .expect("list")
        .into_iter()
        .find(|s| s.shared_to == target)
        .expect("share")
        .read_write
}

#[test]
fn change_ro_flips_the_addressed_personal_share() {
    let mut b = Bench::new();
    let docs = panel_with_link_first(&mut b);

    let s = b.turn(ANN, Command::select(CommandKind::ChangeRo, 2));
    assert!(s.is_sharing());
    let Reply::Content { keyboard, .. } = b.reply() else {
        panic!("expected share panel");
    };
    assert!(keyboard.find("changeRo.2").is_some());
    assert!(read_write_of(&b, &docs, 3));
    assert!(!read_write_of(&b, &docs, BOB));

    b.turn(ANN, Command::select(CommandKind::ChangeRo, 2));
    b.reply();
    assert!(!read_write_of(&b, &docs, 3));
}

#[test]
fn change_ro_on_the_link_is_a_no_op() {
    let mut b = Bench::new();
    let docs = panel_with_link_first(&mut b);
    let before = b.db.list_for_entry(&docs.id).expect("list");

    let s = b.turn(ANN, Command::select(CommandKind::ChangeRo, 0));
    assert!(s.is_sharing());
    assert_eq!(s.subject_id, docs.id);
    b.reply();
    assert_eq!(b.db.list_for_entry(&docs.id).expect("list"), before);
}

#[test]
fn search_paging_reaches_labels_past_the_first_page() {
    let mut b = Bench::new();
    let root = b.root(ANN);
    for i in 0..11 {
        b.create(NewEntry::label(&format!("note {:02}", i), &root, ANN));
    }

    b.turn(ANN, Command::with_input(CommandKind::DoSearch, "note"));
    b.reply();
    let s = b.turn(ANN, Command::new(CommandKind::Forward));
    assert_eq!(s.view_offset, 10);
    assert!(s.is_searching());
    let Reply::Content { keyboard, .. } = b.reply() else {
        panic!("expected results page");
    };
    assert!(keyboard.find("openSearchedLabel.10").is_some());
}
