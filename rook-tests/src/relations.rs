use rook_core::{
    AsValue, ColumnSpec, Connection, Direction, DropBehavior, NoCache, Relation, Schema,
    UnitOfWork,
};
use std::sync::LazyLock;
use tokio::sync::Mutex;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub async fn relations<C: Connection>(connection: &mut C) {
    let _lock = MUTEX.lock().await;

    // Setup
    {
        let mut schema = Schema::new(&mut *connection).expect("Unknown dialect");
        for table in ["membership", "club", "member"] {
            schema
                .drop_table(table, DropBehavior::Cascade, true)
                .await
                .expect("Failed to drop the table");
        }
        schema
            .create_table(
                "member",
                &[
                    ("id", ColumnSpec::primary()),
                    ("name", ColumnSpec::string().length(40)),
                ],
                true,
            )
            .await
            .expect("Failed to create member");
        schema
            .create_table(
                "club",
                &[
                    ("id", ColumnSpec::primary()),
                    ("title", ColumnSpec::string().length(40)),
                ],
                true,
            )
            .await
            .expect("Failed to create club");
        schema
            .create_table(
                "membership",
                &[
                    ("id", ColumnSpec::primary()),
                    ("member_id", ColumnSpec::integer()),
                    ("club_id", ColumnSpec::integer()),
                ],
                true,
            )
            .await
            .expect("Failed to create membership");
    }
    let mut clubs = Vec::new();
    for title in ["chess", "rowing", "choir"] {
        clubs.push(
            connection
                .insert("club", &[("title".into(), title.as_value())], "id")
                .await
                .expect("Failed to insert a club")
                .expect("The club should get a key"),
        );
    }
    let member = connection
        .insert("member", &[("name".into(), "Grace".as_value())], "id")
        .await
        .expect("Failed to insert the member")
        .expect("The member should get a key");
    for club in [&clubs[0], &clubs[2]] {
        connection
            .insert(
                "membership",
                &[
                    ("member_id".into(), member.clone()),
                    ("club_id".into(), club.clone()),
                ],
                "id",
            )
            .await
            .expect("Failed to insert a membership");
    }

    let mut unit = UnitOfWork::new(&mut *connection, &NoCache);
    let grace = unit.find("member", member);
    let relation = Relation::parse("clubThrough", "membership").expect("Valid relation alias");
    assert_eq!(relation.left(), "club");
    let joined = unit
        .through(grace, &relation)
        .expect("Grace is tracked")
        .order_by("club.id", Direction::Asc)
        .fetch(unit.executor())
        .await
        .expect("Failed to fetch the clubs")
        .into_scalars()
        .expect("Only the club keys are selected");
    assert_eq!(joined, [clubs[0].clone(), clubs[2].clone()]);

    let explicit = Relation::through("club", "membership").join_key("membership.club_id");
    let count = unit
        .through(grace, &explicit)
        .expect("Grace is tracked")
        .fetch(unit.executor())
        .await
        .expect("Failed to fetch the clubs")
        .len();
    assert_eq!(count, 2);

    assert!(Relation::parse("through", "membership").is_err());
    assert!(Relation::parse("clubs", "membership").is_err());
}
