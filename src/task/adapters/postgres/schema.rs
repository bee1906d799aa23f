//! Diesel schema for task persistence.

diesel::table! {
    /// Task records scoped by owner.
    tasks (id) {
        /// Sequence-assigned task identifier.
        id -> Int8,
        /// Owning user account.
        owner_id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Unique slug derived at creation.
        slug -> Text,
        /// Free-text description.
        description -> Text,
        /// Creation timestamp.
        created_on -> Timestamptz,
        /// Last mutation timestamp.
        updated_on -> Timestamptz,
        /// Deadline.
        do_before -> Timestamptz,
        /// Completion timestamp.
        finished_on -> Nullable<Timestamptz>,
        /// Completion flag, kept in step with `finished_on`.
        done -> Bool,
    }
}
